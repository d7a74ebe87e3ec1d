use crate::api::{ServiceComparison, ServiceId, ServiceSummary};
use crate::db::repository::{BookingRepository, RepositoryResult};

use super::compare::compare_services;
use super::owner::resolve_owner;

/// Build the full comparison shown by the dashboard.
///
/// Runs the aggregate query, then resolves the owner of `first` and of
/// `second`, one after the other. The first failure aborts the report.
pub async fn build_comparison<R: BookingRepository + ?Sized>(
    repo: &R,
    first: ServiceId,
    second: ServiceId,
) -> RepositoryResult<ServiceComparison> {
    let counts = compare_services(repo, first, second).await?;
    let first_owner = resolve_owner(repo, first).await?;
    let second_owner = resolve_owner(repo, second).await?;

    Ok(ServiceComparison::new(
        ServiceSummary {
            service_id: first,
            owner: first_owner,
            counts: counts.counts_for(first),
        },
        ServiceSummary {
            service_id: second,
            owner: second_owner,
            counts: counts.counts_for(second),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{BookingCounts, DiffIndicator, UserId};
    use crate::db::models::BookingRecord;
    use crate::db::repositories::LocalRepository;

    #[tokio::test]
    async fn test_report_shared_owner() {
        let repo = LocalRepository::new();
        repo.add_user(UserId(1), Some("alice"));
        repo.add_service(ServiceId(1), UserId(1));
        repo.add_service(ServiceId(2), UserId(1));
        repo.add_booking(BookingRecord::new(ServiceId(1), "completed").with_utm_source("instagram"));
        repo.add_booking(BookingRecord::new(ServiceId(2), "ongoing").with_utm_source("instagram"));
        repo.add_booking(BookingRecord::new(ServiceId(2), "ongoing").with_utm_source("instagram"));

        let report = build_comparison(&repo, ServiceId(1), ServiceId(2)).await.unwrap();
        assert_eq!(report.owner_display, "alice");
        assert_eq!(report.organic_diff.value, -1);
        assert_eq!(report.organic_diff.indicator, DiffIndicator::SecondAhead);
        assert_eq!(report.non_organic_diff.indicator, DiffIndicator::Even);
    }

    #[tokio::test]
    async fn test_report_unknown_services() {
        let repo = LocalRepository::new();
        let report = build_comparison(&repo, ServiceId(7), ServiceId(8)).await.unwrap();

        assert_eq!(report.first.counts, BookingCounts::zero());
        assert_eq!(report.second.counts, BookingCounts::zero());
        assert!(report.first.owner.is_placeholder());
        assert_eq!(report.owner_display, crate::api::USERNAME_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_report_fails_as_a_whole() {
        let repo = LocalRepository::new();
        repo.add_booking(BookingRecord::new(ServiceId(1), "completed"));
        repo.set_healthy(false);

        assert!(build_comparison(&repo, ServiceId(1), ServiceId(2)).await.is_err());
    }
}
