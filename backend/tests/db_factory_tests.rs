//! Tests for db::factory module - repository creation and configuration.

mod support;

use std::io::Write;
use std::str::FromStr;

use service_compare::db::factory::{RepositoryBuilder, RepositoryFactory, RepositoryType};
use service_compare::db::{ProviderState, RepositoryError};

#[test]
fn test_repository_type_from_str_postgres() {
    let rt = RepositoryType::from_str("postgres").unwrap();
    assert_eq!(rt, RepositoryType::Postgres);

    let rt = RepositoryType::from_str("POSTGRES").unwrap();
    assert_eq!(rt, RepositoryType::Postgres);

    let rt = RepositoryType::from_str("pg").unwrap();
    assert_eq!(rt, RepositoryType::Postgres);
}

#[test]
fn test_repository_type_from_str_local() {
    let rt = RepositoryType::from_str("LOCAL").unwrap();
    assert_eq!(rt, RepositoryType::Local);
}

#[test]
fn test_repository_type_from_str_invalid() {
    let result = RepositoryType::from_str("invalid");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("Unknown repository type"));
}

#[test]
fn test_repository_type_from_env_default() {
    support::with_scoped_env(&[("REPOSITORY_TYPE", None), ("DB_HOST", None)], || {
        assert_eq!(RepositoryType::from_env().unwrap(), RepositoryType::Local);
    });
}

#[test]
fn test_repository_type_from_env_with_db_host() {
    support::with_scoped_env(
        &[("REPOSITORY_TYPE", None), ("DB_HOST", Some("db.internal"))],
        || {
            assert_eq!(RepositoryType::from_env().unwrap(), RepositoryType::Postgres);
        },
    );
}

#[test]
fn test_repository_type_explicit_overrides_db_host() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("local")),
            ("DB_HOST", Some("db.internal")),
        ],
        || {
            assert_eq!(RepositoryType::from_env().unwrap(), RepositoryType::Local);
        },
    );
}

#[test]
fn test_repository_type_invalid_env_is_configuration_error() {
    let result = support::with_scoped_env(
        &[("REPOSITORY_TYPE", Some("mongo"))],
        RepositoryType::from_env,
    );
    match result {
        Err(RepositoryError::ConfigurationError { message, context }) => {
            assert!(message.contains("REPOSITORY_TYPE"), "{}", message);
            assert!(message.contains("mongo"), "{}", message);
            assert_eq!(context.entity.as_deref(), Some("environment"));
        }
        other => panic!("expected a configuration error, got {:?}", other),
    }
}

#[test]
fn test_factory_from_env_rejects_misspelled_type() {
    let result = support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("postgress")),
            ("DB_HOST", Some("db.internal")),
        ],
        RepositoryFactory::from_env,
    );
    assert!(matches!(
        result,
        Err(RepositoryError::ConfigurationError { .. })
    ));
}

#[test]
fn test_builder_from_env_rejects_unknown_type() {
    let result = support::with_scoped_env(&[("REPOSITORY_TYPE", Some("sqlite"))], || {
        RepositoryBuilder::new().from_env().map(|_| ())
    });
    assert!(matches!(
        result,
        Err(RepositoryError::ConfigurationError { .. })
    ));
}

#[tokio::test]
async fn test_factory_from_env_local() {
    let repo = support::with_scoped_env(&[("REPOSITORY_TYPE", Some("local"))], || {
        RepositoryFactory::from_env().unwrap()
    });
    assert!(repo.health_check().await.unwrap());
    assert_eq!(repo.connection_state(), ProviderState::Open);
}

#[test]
fn test_factory_from_env_postgres_missing_settings() {
    let result = support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("postgres")),
            ("DB_HOST", Some("db.internal")),
            ("DB_NAME", None),
            ("DB_USER", None),
        ],
        RepositoryFactory::from_env,
    );
    match result {
        Err(RepositoryError::ConfigurationError { message, .. }) => {
            assert!(message.contains("DB_NAME"), "{}", message)
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("expected a configuration error"),
    }
}

#[tokio::test]
async fn test_factory_from_config_file_local() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[repository]\ntype = \"local\"").unwrap();

    let repo = RepositoryFactory::from_config_file(file.path()).unwrap();
    assert!(repo.health_check().await.unwrap());
}

#[test]
fn test_factory_from_config_file_missing() {
    assert!(RepositoryFactory::from_config_file("/nonexistent/repository.toml").is_err());
}

#[test]
fn test_builder_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[repository]\ntype = \"local\"").unwrap();

    let repo = RepositoryBuilder::new()
        .from_config_file(file.path())
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(repo.connection_state(), ProviderState::Open);
}

#[cfg(feature = "postgres-repo")]
#[test]
fn test_factory_tunnel_config_starts_closed() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[repository]
type = "postgres"

[database]
host = "db.internal"
name = "bookings"
user = "reader"
mode = "tunnel"

[tunnel]
ssh_host = "bastion.example.com"
"#
    )
    .unwrap();

    let repo = RepositoryFactory::from_config_file(file.path()).unwrap();
    assert_eq!(repo.connection_state(), ProviderState::Closed);
}

#[cfg(not(feature = "postgres-repo"))]
#[test]
fn test_postgres_without_feature_is_configuration_error() {
    let settings = service_compare::db::DatabaseSettings::new("db", "bookings", "reader");
    let result = RepositoryFactory::create(RepositoryType::Postgres, Some(&settings));
    assert!(matches!(
        result,
        Err(RepositoryError::ConfigurationError { .. })
    ));
}
