//! Tests for reading database and tunnel settings from the process environment.

mod support;

use std::path::PathBuf;

use service_compare::db::{provider_for, DatabaseSettings, DbMode, Endpoint, ProviderState};

const BASE: [(&str, Option<&str>); 13] = [
    ("DB_HOST", Some("db.internal")),
    ("DB_NAME", Some("bookings")),
    ("DB_USER", Some("reader")),
    ("DB_PASSWORD", Some("s3cr3t")),
    ("DB_PORT", None),
    ("DB_CONNECT_TIMEOUT_SEC", None),
    ("DB_MODE", None),
    ("SSH_HOST", None),
    ("SSH_PORT", None),
    ("SSH_USER", None),
    ("SSH_KEY_PATH", None),
    ("SSH_REMOTE_DB_HOST", None),
    ("SSH_REMOTE_DB_PORT", None),
];

fn with_env<R>(extra: &[(&str, Option<&str>)], f: impl FnOnce() -> R) -> R {
    let mut changes = BASE.to_vec();
    changes.extend_from_slice(extra);
    support::with_scoped_env(&changes, f)
}

#[test]
fn test_direct_settings_from_env() {
    let settings = with_env(&[("DB_PORT", Some("6543"))], DatabaseSettings::from_env).unwrap();

    assert_eq!(settings.mode, DbMode::Direct);
    assert_eq!(settings.direct_endpoint(), Endpoint::new("db.internal", 6543));
    assert_eq!(
        settings.connection_string(&settings.direct_endpoint()),
        "host='db.internal' port=6543 dbname='bookings' user='reader' password='s3cr3t'"
    );
}

#[test]
fn test_password_is_redacted_in_debug() {
    let settings = with_env(&[], DatabaseSettings::from_env).unwrap();
    let debug = format!("{:?}", settings);
    assert!(!debug.contains("s3cr3t"));
    assert!(debug.contains("<redacted>"));
}

#[test]
fn test_tunnel_settings_from_env() {
    let settings = with_env(
        &[
            ("DB_MODE", Some("tunnel")),
            ("SSH_HOST", Some("bastion.example.com")),
            ("SSH_USER", Some("ubuntu")),
            ("SSH_KEY_PATH", Some("/keys/bastion.pem")),
            ("SSH_REMOTE_DB_HOST", Some("10.0.0.12")),
        ],
        DatabaseSettings::from_env,
    )
    .unwrap();

    assert_eq!(settings.mode, DbMode::Tunnel);
    let tunnel = settings.tunnel.clone().unwrap();
    assert_eq!(tunnel.ssh_host, "bastion.example.com");
    assert_eq!(tunnel.ssh_port, 22);
    assert_eq!(tunnel.ssh_user, "ubuntu");
    assert_eq!(tunnel.key_path, Some(PathBuf::from("/keys/bastion.pem")));
    assert_eq!(tunnel.remote_host, "10.0.0.12");
    assert_eq!(tunnel.remote_port, 5432);

    let provider = provider_for(&settings).unwrap();
    assert_eq!(provider.state(), ProviderState::Closed);
}

#[test]
fn test_unknown_mode_is_rejected() {
    let err = with_env(&[("DB_MODE", Some("carrier-pigeon"))], DatabaseSettings::from_env)
        .unwrap_err();
    assert!(err.contains("DB_MODE"));
}

#[test]
fn test_missing_host_is_rejected() {
    let err = with_env(&[("DB_HOST", None)], DatabaseSettings::from_env).unwrap_err();
    assert!(err.contains("DB_HOST"));
}
