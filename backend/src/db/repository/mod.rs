//! Repository trait for abstracting database operations.
//!
//! The trait defines the two read operations the dashboard needs, allowing
//! different implementations (PostgreSQL, in-memory) to be swapped via
//! dependency injection.

use async_trait::async_trait;

use crate::api::{ServiceBookingCounts, ServiceId};
use crate::db::connection::ProviderState;

mod error;

pub use error::{ErrorContext, ErrorKind, RepositoryError, RepositoryResult};

/// Read access to bookings and service ownership.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to be shared by the HTTP handlers.
///
/// # Error Handling
/// Missing data is never an error: an empty row set or `None` is returned
/// instead. Errors are reserved for connection and query failures.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Check if the database connection is healthy.
    ///
    /// # Returns
    /// - `Ok(true)` if connection is healthy
    /// - `Ok(false)` if connection is unhealthy but no error occurred
    /// - `Err(RepositoryError)` if an error occurred during the check
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Grouped booking counts for two services in a single round trip.
    ///
    /// Only bookings with a counted status are included. Services without
    /// matching bookings have no row.
    async fn booking_counts(
        &self,
        first: ServiceId,
        second: ServiceId,
    ) -> RepositoryResult<Vec<ServiceBookingCounts>>;

    /// Display name of the account owning `service_id`.
    ///
    /// # Returns
    /// * `Ok(None)` - unknown service, or the owner has no display name
    async fn owner_username(&self, service_id: ServiceId) -> RepositoryResult<Option<String>>;

    /// State of the underlying connection provider.
    fn connection_state(&self) -> ProviderState {
        ProviderState::Open
    }

    /// Release connection resources (for example a running tunnel).
    fn shutdown(&self) {}
}
