//! Booking attribution rules.
//!
//! The Postgres repository expresses these rules in SQL; the in-memory
//! repository applies them with [`classify`] and [`is_counted_status`].
//! Both must agree.

use std::collections::BTreeMap;

use crate::api::{BookingCounts, ServiceBookingCounts, ServiceId};
use crate::db::models::BookingRecord;

/// Substring of `utm_source` that marks a booking as organic (case-insensitive).
pub const ORGANIC_SOURCE_MARKER: &str = "instagram";

/// `ILIKE` pattern equivalent to [`ORGANIC_SOURCE_MARKER`].
pub const ORGANIC_SOURCE_PATTERN: &str = "%instagram%";

/// Booking statuses that contribute to counts. Anything else (e.g. `cancelled`) is ignored.
pub const COUNTED_STATUSES: [&str; 3] = ["completed", "ongoing", "upcoming"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribution {
    Organic,
    NonOrganic,
}

/// Classify a booking by its marketing source.
///
/// Missing and empty sources are non-organic.
pub fn classify(utm_source: Option<&str>) -> Attribution {
    match utm_source {
        Some(source) if source.to_lowercase().contains(ORGANIC_SOURCE_MARKER) => {
            Attribution::Organic
        }
        _ => Attribution::NonOrganic,
    }
}

/// Status match is exact, like `status IN (...)` in SQL.
pub fn is_counted_status(status: &str) -> bool {
    COUNTED_STATUSES.contains(&status)
}

/// Group bookings of the requested services into per-service counts.
///
/// Produces a row only for services with at least one counted booking,
/// mirroring `GROUP BY service_id`.
pub fn tally<'a>(
    bookings: impl IntoIterator<Item = &'a BookingRecord>,
    services: &[ServiceId],
) -> Vec<ServiceBookingCounts> {
    let mut grouped: BTreeMap<ServiceId, BookingCounts> = BTreeMap::new();

    for booking in bookings {
        if !services.contains(&booking.service_id) || !is_counted_status(&booking.status) {
            continue;
        }

        let counts = grouped.entry(booking.service_id).or_default();
        counts.total += 1;
        match classify(booking.utm_source().as_deref()) {
            Attribution::Organic => counts.organic += 1,
            Attribution::NonOrganic => counts.non_organic += 1,
        }
    }

    grouped
        .into_iter()
        .map(|(service_id, counts)| ServiceBookingCounts { service_id, counts })
        .collect()
}
