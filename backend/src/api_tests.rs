#[cfg(test)]
mod tests {
    use crate::api::{
        owner_display, BookingCounts, ComparisonResult, CountDiff, DiffIndicator,
        ServiceBookingCounts, ServiceComparison, ServiceId, ServiceSummary, Username,
        USERNAME_PLACEHOLDER,
    };

    fn summary(id: i64, owner: &str, organic: u64, non_organic: u64) -> ServiceSummary {
        ServiceSummary {
            service_id: ServiceId::new(id),
            owner: Username::from_display_name(Some(owner.to_string())),
            counts: BookingCounts::new(organic, non_organic),
        }
    }

    #[test]
    fn test_service_id_new() {
        let id = ServiceId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_service_id_positive() {
        assert_eq!(ServiceId::positive(7).unwrap(), ServiceId(7));
        assert!(ServiceId::positive(0).is_err());
        let err = ServiceId::positive(-3).unwrap_err();
        assert!(err.contains("ServiceId"));
        assert!(err.contains("-3"));
    }

    #[test]
    fn test_booking_counts_new_sums_total() {
        let counts = BookingCounts::new(2, 1);
        assert_eq!(counts.total, 3);
        assert!(!counts.is_zero());
        assert!(BookingCounts::zero().is_zero());
    }

    #[test]
    fn test_comparison_result_fills_missing_ids() {
        let rows = vec![ServiceBookingCounts {
            service_id: ServiceId(101),
            counts: BookingCounts::new(2, 1),
        }];
        let result = ComparisonResult::from_rows(&[ServiceId(101), ServiceId(202)], rows);

        assert_eq!(result.len(), 2);
        assert_eq!(result.counts_for(ServiceId(101)), BookingCounts::new(2, 1));
        assert_eq!(result.get(ServiceId(202)), Some(&BookingCounts::zero()));
    }

    #[test]
    fn test_comparison_result_ignores_unrequested_rows() {
        let rows = vec![ServiceBookingCounts {
            service_id: ServiceId(999),
            counts: BookingCounts::new(5, 5),
        }];
        let result = ComparisonResult::from_rows(&[ServiceId(1), ServiceId(2)], rows);

        assert_eq!(result.len(), 2);
        assert!(result.get(ServiceId(999)).is_none());
    }

    #[test]
    fn test_comparison_result_serializes_as_map() {
        let result = ComparisonResult::from_rows(&[ServiceId(1), ServiceId(2)], vec![]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["1"]["total"], 0);
        assert_eq!(json["2"]["non_organic"], 0);
    }

    #[test]
    fn test_username_placeholder_for_blank_names() {
        assert!(Username::from_display_name(None).is_placeholder());
        assert!(Username::from_display_name(Some(String::new())).is_placeholder());
        assert_eq!(Username::placeholder().as_str(), USERNAME_PLACEHOLDER);

        let name = Username::from_display_name(Some("alice".to_string()));
        assert_eq!(name.as_str(), "alice");
        assert!(!name.is_placeholder());
    }

    #[test]
    fn test_whitespace_username_is_kept() {
        let name = Username::from_display_name(Some(" ".to_string()));
        assert_eq!(name.as_str(), " ");
        assert!(!name.is_placeholder());
    }

    #[test]
    fn test_count_diff_saturates_at_i64_bounds() {
        let diff = CountDiff::between(u64::MAX, 0);
        assert_eq!(diff.value, i64::MAX);
        assert_eq!(diff.indicator, DiffIndicator::FirstAhead);

        let diff = CountDiff::between(0, u64::MAX);
        assert_eq!(diff.value, i64::MIN);
        assert_eq!(diff.indicator, DiffIndicator::SecondAhead);

        let diff = CountDiff::between(u64::MAX, u64::MAX - 3);
        assert_eq!(diff.value, 3);
    }

    #[test]
    fn test_count_diff_first_ahead() {
        let diff = CountDiff::between(10, 4);
        assert_eq!(diff.value, 6);
        assert_eq!(diff.indicator, DiffIndicator::FirstAhead);
    }

    #[test]
    fn test_count_diff_second_ahead() {
        let diff = CountDiff::between(4, 10);
        assert_eq!(diff.value, -6);
        assert_eq!(diff.indicator, DiffIndicator::SecondAhead);
    }

    #[test]
    fn test_count_diff_even() {
        let diff = CountDiff::between(7, 7);
        assert_eq!(diff.value, 0);
        assert_eq!(diff.indicator, DiffIndicator::Even);
    }

    #[test]
    fn test_diff_indicator_serialization() {
        let json = serde_json::to_string(&DiffIndicator::FirstAhead).unwrap();
        assert_eq!(json, "\"first_ahead\"");
        let json = serde_json::to_string(&DiffIndicator::SecondAhead).unwrap();
        assert_eq!(json, "\"second_ahead\"");
    }

    #[test]
    fn test_owner_display_collapses_shared_owner() {
        let alice = Username::from_display_name(Some("alice".to_string()));
        let bob = Username::from_display_name(Some("bob".to_string()));

        assert_eq!(owner_display(&alice, &alice), "alice");
        assert_eq!(owner_display(&alice, &bob), "alice / bob");
        assert_eq!(
            owner_display(&Username::placeholder(), &Username::placeholder()),
            USERNAME_PLACEHOLDER
        );
    }

    #[test]
    fn test_service_comparison_diffs() {
        let comparison = ServiceComparison::new(summary(101, "alice", 2, 1), summary(202, "bob", 0, 0));

        assert_eq!(comparison.organic_diff.value, 2);
        assert_eq!(comparison.non_organic_diff.value, 1);
        assert_eq!(comparison.organic_diff.indicator, DiffIndicator::FirstAhead);
        assert_eq!(comparison.owner_display, "alice / bob");
    }
}
