//! SQL statements and their row types.
//!
//! The statements read the production schema directly; there is no
//! Diesel `table!` mapping for these tables.

use diesel::sql_types::{BigInt, Nullable, Text};
use diesel::QueryableByName;

use crate::api::{BookingCounts, ServiceBookingCounts, ServiceId};

/// Grouped counts for two services.
///
/// Binds: `$1`, `$2` service ids, `$3` organic `ILIKE` pattern, `$4` counted statuses.
pub const BOOKING_COUNTS_SQL: &str = r#"
SELECT
    ab.service_id::bigint AS service_id,
    COUNT(*) AS total,
    COUNT(*) FILTER (
        WHERE bm.utm_params->>'utm_source' ILIKE $3
    ) AS organic,
    COUNT(*) FILTER (
        WHERE bm.utm_params->>'utm_source' NOT ILIKE $3
           OR bm.utm_params->>'utm_source' IS NULL
           OR bm.utm_params->>'utm_source' = ''
    ) AS non_organic
FROM all_bookings_new ab
LEFT JOIN booking_bookingmeta bm ON bm.id = ab.bookingmeta_id
WHERE ab.service_id IN ($1, $2)
  AND ab.status = ANY($4)
GROUP BY ab.service_id
"#;

/// Owner display name of one service. Binds: `$1` service id.
pub const OWNER_USERNAME_SQL: &str = r#"
SELECT u.username
FROM services_service s
JOIN user_user u ON u.id = s.user_id
WHERE s.id = $1
"#;

#[derive(Debug, Clone, QueryableByName)]
pub struct BookingCountsRow {
    #[diesel(sql_type = BigInt)]
    pub service_id: i64,
    #[diesel(sql_type = BigInt)]
    pub total: i64,
    #[diesel(sql_type = BigInt)]
    pub organic: i64,
    #[diesel(sql_type = BigInt)]
    pub non_organic: i64,
}

impl From<BookingCountsRow> for ServiceBookingCounts {
    fn from(row: BookingCountsRow) -> Self {
        ServiceBookingCounts {
            service_id: ServiceId::new(row.service_id),
            counts: BookingCounts {
                total: row.total.max(0) as u64,
                organic: row.organic.max(0) as u64,
                non_organic: row.non_organic.max(0) as u64,
            },
        }
    }
}

#[derive(Debug, Clone, QueryableByName)]
pub struct OwnerRow {
    #[diesel(sql_type = Nullable<Text>)]
    pub username: Option<String>,
}
