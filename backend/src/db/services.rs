//! Repository-level helpers used by the health endpoint.

use std::fmt;

use crate::db::repository::{BookingRepository, RepositoryResult};

/// Check if the repository can reach its database.
pub async fn health_check<R: BookingRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

/// Outcome of a health probe, as reported by `/health`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseStatus {
    Connected,
    Disconnected,
    Error(String),
}

impl DatabaseStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for DatabaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => f.write_str("connected"),
            Self::Disconnected => f.write_str("disconnected"),
            Self::Error(message) => write!(f, "error: {}", message),
        }
    }
}

/// Probe the repository and fold the result into a [`DatabaseStatus`].
pub async fn database_status<R: BookingRepository + ?Sized>(repo: &R) -> DatabaseStatus {
    match repo.health_check().await {
        Ok(true) => DatabaseStatus::Connected,
        Ok(false) => DatabaseStatus::Disconnected,
        Err(e) => {
            log::warn!("Health check failed: {}", e);
            DatabaseStatus::Error(e.to_string())
        }
    }
}
