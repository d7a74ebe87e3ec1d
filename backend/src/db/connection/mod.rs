//! Connection providers.
//!
//! A provider hands out the endpoint the query executor should connect to.
//! The direct provider returns the configured database host; the tunnel
//! provider owns an SSH port forward and returns its loopback end.
//!
//! Providers are constructed once at process start and shared by `Arc`.
//!
//! ```text
//!            acquire()                 ready
//!   Closed ───────────▶ Connecting ───────────▶ Open
//!     ▲                     │                    │
//!     │ shutdown()          │ spawn/timeout      │ tunnel died
//!     │                     ▼                    ▼
//!     └──────────────── Failed ◀──────── (reconnect on next acquire)
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::config::{DatabaseSettings, DbMode};
use super::repository::{RepositoryError, RepositoryResult};

mod direct;
mod tunnel;

pub use direct::DirectProvider;
pub use tunnel::TunnelProvider;

/// Host and port the executor connects to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn loopback(port: u16) -> Self {
        Self::new("127.0.0.1", port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Lifecycle state of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderState {
    Closed,
    Connecting,
    Open,
    Failed,
}

impl fmt::Display for ProviderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Closed => "closed",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Source of database endpoints for the query executor.
///
/// `acquire` may block (the tunnel provider starts ssh and waits for the
/// forwarded port), so callers run it off the async runtime.
pub trait ConnectionProvider: Send + Sync {
    /// Get an endpoint that currently accepts connections.
    fn acquire(&self) -> RepositoryResult<Endpoint>;

    /// Return an endpoint obtained from `acquire`.
    fn release(&self, endpoint: &Endpoint);

    fn state(&self) -> ProviderState;

    /// Tear down owned resources and go back to `Closed`.
    fn shutdown(&self);
}

/// Build the provider matching `settings.mode`.
pub fn provider_for(settings: &DatabaseSettings) -> RepositoryResult<Arc<dyn ConnectionProvider>> {
    match settings.mode {
        DbMode::Direct => Ok(Arc::new(DirectProvider::new(settings.direct_endpoint()))),
        DbMode::Tunnel => {
            let tunnel = settings.tunnel.clone().ok_or_else(|| {
                RepositoryError::configuration("Tunnel mode requires tunnel settings")
            })?;
            Ok(Arc::new(TunnelProvider::new(tunnel)))
        }
    }
}
