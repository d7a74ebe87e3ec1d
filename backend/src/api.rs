//! Public API surface for the comparison backend.
//!
//! This file consolidates the domain and DTO types shared by the service layer,
//! the repositories and the HTTP API. All types derive Serialize for JSON output.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::define_id_type!(i64, ServiceId);
crate::define_id_type!(i64, UserId);

/// Display value used when a service has no owner or the owner has no name.
pub const USERNAME_PLACEHOLDER: &str = "—";

/// Booking counts for a single service.
///
/// `total == organic + non_organic` holds for every value produced by a repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingCounts {
    pub total: u64,
    pub organic: u64,
    pub non_organic: u64,
}

impl BookingCounts {
    pub fn new(organic: u64, non_organic: u64) -> Self {
        Self {
            total: organic + non_organic,
            organic,
            non_organic,
        }
    }

    /// Counts for a service without any matching booking.
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.total == 0
    }
}

/// Grouped counts as returned by the aggregate query, one row per service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceBookingCounts {
    pub service_id: ServiceId,
    pub counts: BookingCounts,
}

/// Per-service booking counts for one comparison request.
///
/// Holds exactly one entry per requested service id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ComparisonResult {
    counts: BTreeMap<ServiceId, BookingCounts>,
}

impl ComparisonResult {
    /// Build the result for the requested ids, keeping only rows for those ids
    /// and filling `{0, 0, 0}` for ids without rows.
    pub fn from_rows(
        requested: &[ServiceId],
        rows: impl IntoIterator<Item = ServiceBookingCounts>,
    ) -> Self {
        let mut counts: BTreeMap<ServiceId, BookingCounts> = rows
            .into_iter()
            .filter(|row| requested.contains(&row.service_id))
            .map(|row| (row.service_id, row.counts))
            .collect();

        for id in requested {
            counts.entry(*id).or_insert_with(BookingCounts::zero);
        }

        Self { counts }
    }

    pub fn get(&self, service_id: ServiceId) -> Option<&BookingCounts> {
        self.counts.get(&service_id)
    }

    /// Counts for `service_id`, or zero counts if it was not part of the request.
    pub fn counts_for(&self, service_id: ServiceId) -> BookingCounts {
        self.counts.get(&service_id).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ServiceId, &BookingCounts)> {
        self.counts.iter()
    }
}

/// Display name of the account owning a service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Normalize a looked-up display name; a missing or empty name becomes the placeholder.
    pub fn from_display_name(name: Option<String>) -> Self {
        match name {
            Some(name) if !name.is_empty() => Self(name),
            _ => Self::placeholder(),
        }
    }

    pub fn placeholder() -> Self {
        Self(USERNAME_PLACEHOLDER.to_string())
    }

    pub fn is_placeholder(&self) -> bool {
        self.0 == USERNAME_PLACEHOLDER
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Direction of a difference between the first and the second service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffIndicator {
    /// First service has more (positive difference).
    FirstAhead,
    /// Second service has more (negative difference).
    SecondAhead,
    Even,
}

/// Signed difference `first - second` with its direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountDiff {
    pub value: i64,
    pub indicator: DiffIndicator,
}

impl CountDiff {
    pub fn between(first: u64, second: u64) -> Self {
        let wide = i128::from(first) - i128::from(second);
        let value = wide.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64;
        let indicator = match value.cmp(&0) {
            std::cmp::Ordering::Greater => DiffIndicator::FirstAhead,
            std::cmp::Ordering::Less => DiffIndicator::SecondAhead,
            std::cmp::Ordering::Equal => DiffIndicator::Even,
        };
        Self { value, indicator }
    }
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceSummary {
    pub service_id: ServiceId,
    pub owner: Username,
    pub counts: BookingCounts,
}

/// Complete comparison handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceComparison {
    pub first: ServiceSummary,
    pub second: ServiceSummary,
    /// Single owner name when both services share it, otherwise `"first / second"`.
    pub owner_display: String,
    pub organic_diff: CountDiff,
    pub non_organic_diff: CountDiff,
    pub generated_at: DateTime<Utc>,
}

impl ServiceComparison {
    pub fn new(first: ServiceSummary, second: ServiceSummary) -> Self {
        let owner_display = owner_display(&first.owner, &second.owner);
        let organic_diff = CountDiff::between(first.counts.organic, second.counts.organic);
        let non_organic_diff =
            CountDiff::between(first.counts.non_organic, second.counts.non_organic);

        Self {
            first,
            second,
            owner_display,
            organic_diff,
            non_organic_diff,
            generated_at: Utc::now(),
        }
    }
}

/// Collapse two owner names into the value shown in the username column.
pub fn owner_display(first: &Username, second: &Username) -> String {
    if first == second {
        first.to_string()
    } else {
        format!("{} / {}", first, second)
    }
}
