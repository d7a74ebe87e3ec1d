//! Repository configuration file support.
//!
//! Reads `repository.toml`:
//!
//! ```toml
//! [repository]
//! type = "postgres"
//!
//! [database]
//! host = "db.internal"
//! name = "bookings"
//! user = "reader"
//! mode = "tunnel"
//!
//! [tunnel]
//! ssh_host = "bastion.example.com"
//! key_path = "~/.ssh/bastion.pem"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::config::{
    DatabaseSettings, DbMode, TunnelSettings, DEFAULT_DB_PORT, DEFAULT_SSH_BINARY,
    DEFAULT_SSH_PORT, DEFAULT_SSH_USER, DEFAULT_TUNNEL_READY_TIMEOUT_SEC,
};
use super::factory::RepositoryType;
use super::repository::{ErrorContext, RepositoryError, RepositoryResult};

/// Repository configuration from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub repository: RepositorySection,
    #[serde(default)]
    pub database: Option<DatabaseSection>,
    #[serde(default)]
    pub tunnel: Option<TunnelSection>,
}

/// Repository type settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySection {
    #[serde(rename = "type")]
    pub repo_type: String,
}

/// `[database]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    pub name: String,
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub connect_timeout: Option<u64>,
    #[serde(default = "default_mode")]
    pub mode: String,
}

/// `[tunnel]` table, read when `database.mode` is `tunnel`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TunnelSection {
    pub ssh_host: String,
    #[serde(default = "default_ssh_port")]
    pub ssh_port: u16,
    #[serde(default = "default_ssh_user")]
    pub ssh_user: String,
    #[serde(default)]
    pub key_path: Option<PathBuf>,
    /// Defaults to `database.host`
    #[serde(default)]
    pub remote_host: Option<String>,
    #[serde(default = "default_db_port")]
    pub remote_port: u16,
    #[serde(default = "default_ssh_binary")]
    pub ssh_binary: String,
    #[serde(default = "default_ready_timeout")]
    pub ready_timeout: u64,
}

fn default_db_port() -> u16 {
    DEFAULT_DB_PORT
}

fn default_mode() -> String {
    "direct".to_string()
}

fn default_ssh_port() -> u16 {
    DEFAULT_SSH_PORT
}

fn default_ssh_user() -> String {
    DEFAULT_SSH_USER.to_string()
}

fn default_ssh_binary() -> String {
    DEFAULT_SSH_BINARY.to_string()
}

fn default_ready_timeout() -> u64 {
    DEFAULT_TUNNEL_READY_TIMEOUT_SEC
}

fn config_error(message: impl Into<String>) -> RepositoryError {
    RepositoryError::configuration_with_context(
        message,
        ErrorContext::new("load_config").with_entity("repository.toml"),
    )
}

impl RepositoryConfig {
    /// Load repository configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> RepositoryResult<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| config_error(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> RepositoryResult<Self> {
        toml::from_str(content)
            .map_err(|e| config_error(format!("Failed to parse config file: {}", e)))
    }

    /// Load repository configuration from the default location.
    ///
    /// Searches for `repository.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> RepositoryResult<Self> {
        match Self::find_default_file() {
            Some(path) => Self::from_file(&path),
            None => Err(config_error("No repository.toml found in standard locations")),
        }
    }

    /// First existing `repository.toml` among the standard locations.
    pub fn find_default_file() -> Option<PathBuf> {
        [
            "repository.toml",
            "backend/repository.toml",
            "../repository.toml",
        ]
        .iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
    }

    pub fn repository_type(&self) -> RepositoryResult<RepositoryType> {
        RepositoryType::from_str(&self.repository.repo_type)
            .map_err(|e| config_error(format!("Invalid repository type: {}", e)))
    }

    /// Database settings for a Postgres configuration, `None` for local.
    pub fn to_database_settings(&self) -> RepositoryResult<Option<DatabaseSettings>> {
        if self.repository_type()? != RepositoryType::Postgres {
            return Ok(None);
        }

        let db = self.database.as_ref().ok_or_else(|| {
            config_error("Postgres repository requires a [database] table")
        })?;
        let mode = DbMode::from_str(&db.mode).map_err(config_error)?;

        let tunnel = match mode {
            DbMode::Direct => None,
            DbMode::Tunnel => {
                let section = self.tunnel.as_ref().ok_or_else(|| {
                    config_error("database.mode = \"tunnel\" requires a [tunnel] table")
                })?;
                Some(TunnelSettings {
                    ssh_host: section.ssh_host.clone(),
                    ssh_port: section.ssh_port,
                    ssh_user: section.ssh_user.clone(),
                    key_path: section.key_path.clone(),
                    remote_host: section
                        .remote_host
                        .clone()
                        .unwrap_or_else(|| db.host.clone()),
                    remote_port: section.remote_port,
                    ssh_binary: section.ssh_binary.clone(),
                    ready_timeout_sec: section.ready_timeout,
                })
            }
        };

        Ok(Some(DatabaseSettings {
            host: db.host.clone(),
            port: db.port,
            name: db.name.clone(),
            user: db.user.clone(),
            password: db.password.clone(),
            connect_timeout_sec: db.connect_timeout,
            mode,
            tunnel,
        }))
    }
}
