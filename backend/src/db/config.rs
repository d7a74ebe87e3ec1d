//! Database configuration and environment variable handling.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use super::connection::Endpoint;

pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_SSH_PORT: u16 = 22;
pub const DEFAULT_SSH_USER: &str = "ec2-user";
pub const DEFAULT_SSH_BINARY: &str = "ssh";
pub const DEFAULT_TUNNEL_READY_TIMEOUT_SEC: u64 = 10;

/// How the executor reaches the database host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DbMode {
    /// Connect straight to `DB_HOST:DB_PORT`.
    #[default]
    Direct,
    /// Forward a loopback port through an SSH bastion.
    Tunnel,
}

impl FromStr for DbMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "direct" => Ok(Self::Direct),
            "tunnel" | "ssh" => Ok(Self::Tunnel),
            other => Err(format!(
                "Unsupported DB_MODE '{}'. Use direct or tunnel.",
                other
            )),
        }
    }
}

/// SSH tunnel parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelSettings {
    /// Bastion host running sshd
    pub ssh_host: String,
    pub ssh_port: u16,
    pub ssh_user: String,
    /// Private key passed to ssh with `-i`
    pub key_path: Option<PathBuf>,
    /// Database host as seen from the bastion
    pub remote_host: String,
    /// Database port as seen from the bastion
    pub remote_port: u16,
    /// ssh executable
    pub ssh_binary: String,
    /// How long to wait for the forwarded port to accept connections
    pub ready_timeout_sec: u64,
}

impl TunnelSettings {
    pub fn new(ssh_host: impl Into<String>, remote_host: impl Into<String>) -> Self {
        Self {
            ssh_host: ssh_host.into(),
            ssh_port: DEFAULT_SSH_PORT,
            ssh_user: DEFAULT_SSH_USER.to_string(),
            key_path: None,
            remote_host: remote_host.into(),
            remote_port: DEFAULT_DB_PORT,
            ssh_binary: DEFAULT_SSH_BINARY.to_string(),
            ready_timeout_sec: DEFAULT_TUNNEL_READY_TIMEOUT_SEC,
        }
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_sec)
    }
}

/// Database settings consumed by the query executor.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    /// libpq `connect_timeout`, unset by default
    pub connect_timeout_sec: Option<u64>,
    pub mode: DbMode,
    /// Present when `mode` is `Tunnel`
    pub tunnel: Option<TunnelSettings>,
}

impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("connect_timeout_sec", &self.connect_timeout_sec)
            .field("mode", &self.mode)
            .field("tunnel", &self.tunnel)
            .finish()
    }
}

impl DatabaseSettings {
    /// Direct-mode settings with default port and no password.
    pub fn new(host: impl Into<String>, name: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_DB_PORT,
            name: name.into(),
            user: user.into(),
            password: String::new(),
            connect_timeout_sec: None,
            mode: DbMode::Direct,
            tunnel: None,
        }
    }

    /// Create database settings from environment variables.
    ///
    /// # Environment Variables
    /// - `DB_HOST` (required): database host, also the default tunnel remote host
    /// - `DB_NAME` (required): database name
    /// - `DB_USER` (required): database user
    /// - `DB_PASSWORD` (optional, default: empty)
    /// - `DB_PORT` (optional, default: 5432)
    /// - `DB_CONNECT_TIMEOUT_SEC` (optional): libpq connect timeout
    /// - `DB_MODE` (optional, default: direct): `direct` | `tunnel`
    /// - `SSH_HOST` (required in tunnel mode)
    /// - `SSH_PORT` (default: 22), `SSH_USER` (default: ec2-user), `SSH_KEY_PATH`
    /// - `SSH_REMOTE_DB_HOST` (default: `DB_HOST`), `SSH_REMOTE_DB_PORT` (default: 5432)
    /// - `SSH_BINARY` (default: ssh), `SSH_READY_TIMEOUT_SEC` (default: 10)
    ///
    /// # Errors
    /// Returns an error if required variables are not set or numbers do not parse.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`DatabaseSettings::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            var(key).ok_or_else(|| format!("{} environment variable not set", key))
        };

        let host = required("DB_HOST")?;
        let name = required("DB_NAME")?;
        let user = required("DB_USER")?;
        let password = lookup("DB_PASSWORD").unwrap_or_default();
        let port = parse_or(var("DB_PORT"), "DB_PORT", DEFAULT_DB_PORT)?;
        let connect_timeout_sec = var("DB_CONNECT_TIMEOUT_SEC")
            .map(|v| {
                v.parse::<u64>()
                    .map_err(|_| "DB_CONNECT_TIMEOUT_SEC must be a number of seconds".to_string())
            })
            .transpose()?;
        let mode: DbMode = var("DB_MODE").unwrap_or_default().parse()?;

        let tunnel = match mode {
            DbMode::Direct => None,
            DbMode::Tunnel => {
                let ssh_host = var("SSH_HOST")
                    .ok_or_else(|| "SSH_HOST must be set when DB_MODE=tunnel".to_string())?;
                let remote_host = var("SSH_REMOTE_DB_HOST").unwrap_or_else(|| host.clone());

                Some(TunnelSettings {
                    ssh_host,
                    ssh_port: parse_or(var("SSH_PORT"), "SSH_PORT", DEFAULT_SSH_PORT)?,
                    ssh_user: var("SSH_USER").unwrap_or_else(|| DEFAULT_SSH_USER.to_string()),
                    key_path: var("SSH_KEY_PATH").map(PathBuf::from),
                    remote_host,
                    remote_port: parse_or(
                        var("SSH_REMOTE_DB_PORT"),
                        "SSH_REMOTE_DB_PORT",
                        DEFAULT_DB_PORT,
                    )?,
                    ssh_binary: var("SSH_BINARY").unwrap_or_else(|| DEFAULT_SSH_BINARY.to_string()),
                    ready_timeout_sec: parse_or(
                        var("SSH_READY_TIMEOUT_SEC"),
                        "SSH_READY_TIMEOUT_SEC",
                        DEFAULT_TUNNEL_READY_TIMEOUT_SEC,
                    )?,
                })
            }
        };

        Ok(Self {
            host,
            port,
            name,
            user,
            password,
            connect_timeout_sec,
            mode,
            tunnel,
        })
    }

    /// The endpoint used when no tunnel is involved.
    pub fn direct_endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.port)
    }

    /// libpq keyword/value connection string for `endpoint`.
    pub fn connection_string(&self, endpoint: &Endpoint) -> String {
        let mut parts = vec![
            format!("host={}", quote_conninfo(&endpoint.host)),
            format!("port={}", endpoint.port),
            format!("dbname={}", quote_conninfo(&self.name)),
            format!("user={}", quote_conninfo(&self.user)),
        ];
        if !self.password.is_empty() {
            parts.push(format!("password={}", quote_conninfo(&self.password)));
        }
        if let Some(timeout) = self.connect_timeout_sec {
            parts.push(format!("connect_timeout={}", timeout));
        }
        parts.join(" ")
    }
}

fn parse_or<T: FromStr>(value: Option<String>, key: &str, default: T) -> Result<T, String> {
    match value {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| format!("{} must be a valid number, got '{}'", key, v)),
        None => Ok(default),
    }
}

/// Quote a conninfo value: wrap in single quotes, escape `\` and `'`.
fn quote_conninfo(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}'", escaped)
}
