//! Row-level records held by the in-memory repository.

use serde_json::Value;

use crate::api::{ServiceId, UserId};

/// Marketing attribution metadata attached to a booking.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingMeta {
    /// JSON object of UTM parameters, e.g. `{"utm_source": "instagram_reels"}`
    pub utm_params: Value,
}

impl BookingMeta {
    pub fn new(utm_params: Value) -> Self {
        Self { utm_params }
    }

    /// Text value of `utm_source`, with Postgres `->>` semantics:
    /// strings as-is, JSON null or a missing key as `None`, other values as JSON text.
    pub fn utm_source(&self) -> Option<String> {
        match self.utm_params.get("utm_source")? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// A booking row.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRecord {
    pub service_id: ServiceId,
    pub status: String,
    pub metadata: Option<BookingMeta>,
}

impl BookingRecord {
    /// Booking without attribution metadata.
    pub fn new(service_id: ServiceId, status: impl Into<String>) -> Self {
        Self {
            service_id,
            status: status.into(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, utm_params: Value) -> Self {
        self.metadata = Some(BookingMeta::new(utm_params));
        self
    }

    pub fn with_utm_source(self, source: impl Into<String>) -> Self {
        self.with_metadata(serde_json::json!({ "utm_source": source.into() }))
    }

    /// Marketing source of the booking, if any metadata carries one.
    pub fn utm_source(&self) -> Option<String> {
        self.metadata.as_ref().and_then(BookingMeta::utm_source)
    }
}

/// A bookable service and its owning account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRecord {
    pub service_id: ServiceId,
    pub user_id: UserId,
}

/// An account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub user_id: UserId,
    pub username: Option<String>,
}
