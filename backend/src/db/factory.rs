//! Repository factory for dependency injection.
//!
//! This module creates repository instances from runtime configuration. The
//! Postgres repository gets its connection provider (direct or tunnel) here,
//! so the rest of the crate only ever sees `Arc<dyn BookingRepository>`.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use super::config::DatabaseSettings;
use super::repo_config::RepositoryConfig;
use super::repositories::LocalRepository;
use super::repository::{BookingRepository, ErrorContext, RepositoryError, RepositoryResult};

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// Postgres + Diesel implementation
    Postgres,
    /// In-memory local repository
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Parse repository type from string ("postgres", "pg", "local").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "pg" => Ok(Self::Postgres),
            "local" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Get repository type from environment variables.
    ///
    /// Reads `REPOSITORY_TYPE`. Without it, defaults to Postgres when
    /// `DB_HOST` is set, otherwise Local. An unrecognised `REPOSITORY_TYPE`
    /// is a configuration error.
    pub fn from_env() -> RepositoryResult<Self> {
        if let Ok(val) = std::env::var("REPOSITORY_TYPE") {
            return val.parse().map_err(|e| {
                RepositoryError::configuration_with_context(
                    format!("Invalid REPOSITORY_TYPE: {}", e),
                    ErrorContext::new("load_settings").with_entity("environment"),
                )
            });
        }

        match std::env::var("DB_HOST") {
            Ok(host) if !host.trim().is_empty() => Ok(Self::Postgres),
            _ => Ok(Self::Local),
        }
    }
}

/// Repository factory for creating repository instances.
///
/// # Example
/// ```
/// use service_compare::db::{BookingRepository, RepositoryFactory, RepositoryType};
///
/// let repo = RepositoryFactory::create(RepositoryType::Local, None).unwrap();
/// assert_eq!(repo.connection_state().to_string(), "open");
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository instance based on type.
    ///
    /// # Arguments
    /// * `repo_type` - Type of repository to create
    /// * `settings` - Database settings (required for Postgres)
    pub fn create(
        repo_type: RepositoryType,
        settings: Option<&DatabaseSettings>,
    ) -> RepositoryResult<Arc<dyn BookingRepository>> {
        match repo_type {
            RepositoryType::Postgres => {
                let settings = settings.ok_or_else(|| {
                    RepositoryError::configuration(
                        "Postgres repository requires database settings",
                    )
                })?;
                Self::create_postgres(settings)
            }
            RepositoryType::Local => Ok(Self::create_local()),
        }
    }

    /// Create a Postgres repository with the provider matching `settings.mode`.
    ///
    /// No connection is attempted here; the first query opens one.
    #[cfg(feature = "postgres-repo")]
    pub fn create_postgres(
        settings: &DatabaseSettings,
    ) -> RepositoryResult<Arc<dyn BookingRepository>> {
        use super::connection::provider_for;
        use super::repositories::PostgresRepository;

        let provider = provider_for(settings)?;
        log::info!(
            "Creating Postgres repository ({:?} mode, database {})",
            settings.mode,
            settings.name
        );
        Ok(Arc::new(PostgresRepository::new(settings.clone(), provider)))
    }

    #[cfg(not(feature = "postgres-repo"))]
    pub fn create_postgres(
        _settings: &DatabaseSettings,
    ) -> RepositoryResult<Arc<dyn BookingRepository>> {
        Err(RepositoryError::configuration(
            "Postgres repository feature not enabled",
        ))
    }

    /// Create an in-memory local repository.
    pub fn create_local() -> Arc<dyn BookingRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Create repository from environment configuration.
    ///
    /// See [`RepositoryType::from_env`] and [`DatabaseSettings::from_env`].
    pub fn from_env() -> RepositoryResult<Arc<dyn BookingRepository>> {
        match RepositoryType::from_env()? {
            RepositoryType::Postgres => {
                let settings = DatabaseSettings::from_env().map_err(|e| {
                    RepositoryError::configuration_with_context(
                        e,
                        ErrorContext::new("load_settings").with_entity("environment"),
                    )
                })?;
                Self::create_postgres(&settings)
            }
            RepositoryType::Local => Ok(Self::create_local()),
        }
    }

    /// Create repository from a TOML configuration file.
    pub fn from_config_file<P: AsRef<Path>>(
        config_path: P,
    ) -> RepositoryResult<Arc<dyn BookingRepository>> {
        let config = RepositoryConfig::from_file(config_path)?;
        Self::from_repository_config(&config)
    }

    /// Create repository from the default configuration file location.
    ///
    /// Searches for `repository.toml` in standard locations.
    pub fn from_default_config() -> RepositoryResult<Arc<dyn BookingRepository>> {
        let config = RepositoryConfig::from_default_location()?;
        Self::from_repository_config(&config)
    }

    fn from_repository_config(
        config: &RepositoryConfig,
    ) -> RepositoryResult<Arc<dyn BookingRepository>> {
        let repo_type = config.repository_type()?;
        let settings = config.to_database_settings()?;
        Self::create(repo_type, settings.as_ref())
    }
}

/// Builder for configuring repository creation.
///
/// # Example
/// ```
/// use service_compare::db::{RepositoryBuilder, RepositoryType};
///
/// let repo = RepositoryBuilder::new()
///     .repository_type(RepositoryType::Local)
///     .build()
///     .unwrap();
/// # let _ = repo;
/// ```
pub struct RepositoryBuilder {
    repo_type: RepositoryType,
    settings: Option<DatabaseSettings>,
}

impl RepositoryBuilder {
    /// Create a new builder for the in-memory repository.
    ///
    /// Use [`RepositoryBuilder::from_env`] or [`RepositoryBuilder::from_config_file`]
    /// to pick the type from configuration.
    pub fn new() -> Self {
        Self {
            repo_type: RepositoryType::Local,
            settings: None,
        }
    }

    pub fn repository_type(mut self, repo_type: RepositoryType) -> Self {
        self.repo_type = repo_type;
        self
    }

    pub fn database_settings(mut self, settings: DatabaseSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Load type and database settings from environment variables.
    pub fn from_env(mut self) -> RepositoryResult<Self> {
        self.repo_type = RepositoryType::from_env()?;

        if self.repo_type == RepositoryType::Postgres {
            let settings =
                DatabaseSettings::from_env().map_err(RepositoryError::configuration)?;
            self.settings = Some(settings);
        }

        Ok(self)
    }

    /// Load type and database settings from a TOML file.
    pub fn from_config_file<P: AsRef<Path>>(mut self, config_path: P) -> RepositoryResult<Self> {
        let config = RepositoryConfig::from_file(config_path)?;
        self.repo_type = config.repository_type()?;
        self.settings = config.to_database_settings()?;
        Ok(self)
    }

    pub fn build(self) -> RepositoryResult<Arc<dyn BookingRepository>> {
        RepositoryFactory::create(self.repo_type, self.settings.as_ref())
    }
}

impl Default for RepositoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
