use log::debug;

use crate::api::{ComparisonResult, ServiceId};
use crate::db::repository::{BookingRepository, RepositoryResult};

/// Booking counts for two services, split into organic and non-organic.
///
/// Issues one grouped query. Every requested id is present in the result;
/// ids without counted bookings get `{0, 0, 0}`. Repository failures are
/// returned unchanged.
pub async fn compare_services<R: BookingRepository + ?Sized>(
    repo: &R,
    first: ServiceId,
    second: ServiceId,
) -> RepositoryResult<ComparisonResult> {
    let rows = repo.booking_counts(first, second).await?;
    debug!(
        "Aggregated {} booking row(s) for services {} and {}",
        rows.len(),
        first,
        second
    );

    let requested = if first == second {
        vec![first]
    } else {
        vec![first, second]
    };
    Ok(ComparisonResult::from_rows(&requested, rows))
}
