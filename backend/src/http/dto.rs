//! Data Transfer Objects for the HTTP API.

use serde::{Deserialize, Serialize};

use crate::api::ServiceId;
use crate::db::connection::ProviderState;

pub use crate::api::{CountDiff, DiffIndicator, ServiceComparison, ServiceSummary};

/// Query string shared by `/compare` and `/v1/compare`.
///
/// Both fields are kept as raw text so that a malformed id can be reported
/// on the page instead of failing extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompareQuery {
    #[serde(default)]
    pub service_a: Option<String>,
    #[serde(default)]
    pub service_b: Option<String>,
}

/// Outcome of validating a [`CompareQuery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompareRequest {
    /// At least one id was left empty.
    Missing,
    /// An id is not a positive integer.
    Invalid(String),
    /// Both ids are the same service.
    Same(ServiceId),
    Ready { first: ServiceId, second: ServiceId },
}

impl CompareQuery {
    pub fn new(service_a: impl Into<String>, service_b: impl Into<String>) -> Self {
        Self {
            service_a: Some(service_a.into()),
            service_b: Some(service_b.into()),
        }
    }

    /// Trimmed, non-empty value of the first id field.
    pub fn service_a_text(&self) -> Option<&str> {
        non_empty(&self.service_a)
    }

    pub fn service_b_text(&self) -> Option<&str> {
        non_empty(&self.service_b)
    }

    pub fn parse(&self) -> CompareRequest {
        let (raw_a, raw_b) = match (self.service_a_text(), self.service_b_text()) {
            (Some(a), Some(b)) => (a, b),
            _ => return CompareRequest::Missing,
        };

        let first = match parse_service_id("Service 1 ID", raw_a) {
            Ok(id) => id,
            Err(message) => return CompareRequest::Invalid(message),
        };
        let second = match parse_service_id("Service 2 ID", raw_b) {
            Ok(id) => id,
            Err(message) => return CompareRequest::Invalid(message),
        };

        if first == second {
            CompareRequest::Same(first)
        } else {
            CompareRequest::Ready { first, second }
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_service_id(label: &str, raw: &str) -> Result<ServiceId, String> {
    raw.parse::<i64>()
        .ok()
        .and_then(|v| ServiceId::positive(v).ok())
        .ok_or_else(|| format!("{} must be a positive integer, got '{}'", label, raw))
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// API version
    pub version: String,
    /// Database connection status
    pub database: String,
    /// Connection provider state
    pub connection: ProviderState,
}
