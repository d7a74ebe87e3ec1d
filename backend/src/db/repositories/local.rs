//! In-memory local repository implementation.
//!
//! This module provides a local implementation of [`BookingRepository`]
//! suitable for unit testing and local development. All data is stored in
//! memory, providing fast, deterministic, and isolated execution.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::api::{ServiceBookingCounts, ServiceId, UserId};
use crate::db::connection::ProviderState;
use crate::db::models::{BookingRecord, ServiceRecord, UserRecord};
use crate::db::repository::{BookingRepository, ErrorContext, RepositoryError, RepositoryResult};
use crate::services::attribution;

/// In-memory local repository.
///
/// # Example
/// ```
/// use service_compare::api::{ServiceId, UserId};
/// use service_compare::db::models::BookingRecord;
/// use service_compare::db::repositories::LocalRepository;
///
/// let repo = LocalRepository::new();
/// repo.add_user(UserId(1), Some("alice"));
/// repo.add_service(ServiceId(101), UserId(1));
/// repo.add_booking(BookingRecord::new(ServiceId(101), "completed").with_utm_source("instagram"));
/// assert_eq!(repo.booking_count(), 1);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    bookings: Vec<BookingRecord>,
    services: HashMap<ServiceId, ServiceRecord>,
    users: HashMap<UserId, UserRecord>,

    // Simulated connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            bookings: Vec::new(),
            services: HashMap::new(),
            users: HashMap::new(),
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    pub fn add_booking(&self, booking: BookingRecord) {
        let mut data = self.data.write().unwrap_or_else(|e| e.into_inner());
        data.bookings.push(booking);
    }

    /// Register a service owned by `user_id`. Re-adding a service replaces its owner.
    pub fn add_service(&self, service_id: ServiceId, user_id: UserId) {
        let mut data = self.data.write().unwrap_or_else(|e| e.into_inner());
        data.services
            .insert(service_id, ServiceRecord { service_id, user_id });
    }

    pub fn add_user(&self, user_id: UserId, username: Option<&str>) {
        let mut data = self.data.write().unwrap_or_else(|e| e.into_inner());
        data.users.insert(
            user_id,
            UserRecord {
                user_id,
                username: username.map(str::to_string),
            },
        );
    }

    pub fn booking_count(&self) -> usize {
        self.data
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .bookings
            .len()
    }

    /// Simulate a lost database connection. Every query fails while unhealthy.
    pub fn set_healthy(&self, healthy: bool) {
        let mut data = self.data.write().unwrap_or_else(|e| e.into_inner());
        data.is_healthy = healthy;
    }

    /// Remove all stored data.
    pub fn clear(&self) {
        let mut data = self.data.write().unwrap_or_else(|e| e.into_inner());
        *data = LocalData::default();
    }

    fn ensure_connected(data: &LocalData, operation: &str) -> RepositoryResult<()> {
        if data.is_healthy {
            Ok(())
        } else {
            Err(RepositoryError::connection_with_context(
                "Local repository is marked unhealthy",
                ErrorContext::new(operation),
            ))
        }
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookingRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        let data = self.data.read().unwrap_or_else(|e| e.into_inner());
        Ok(data.is_healthy)
    }

    async fn booking_counts(
        &self,
        first: ServiceId,
        second: ServiceId,
    ) -> RepositoryResult<Vec<ServiceBookingCounts>> {
        let data = self.data.read().unwrap_or_else(|e| e.into_inner());
        Self::ensure_connected(&data, "booking_counts")?;
        Ok(attribution::tally(&data.bookings, &[first, second]))
    }

    async fn owner_username(&self, service_id: ServiceId) -> RepositoryResult<Option<String>> {
        let data = self.data.read().unwrap_or_else(|e| e.into_inner());
        Self::ensure_connected(&data, "owner_username")?;

        Ok(data
            .services
            .get(&service_id)
            .and_then(|service| data.users.get(&service.user_id))
            .and_then(|user| user.username.clone()))
    }

    fn connection_state(&self) -> ProviderState {
        let data = self.data.read().unwrap_or_else(|e| e.into_inner());
        if data.is_healthy {
            ProviderState::Open
        } else {
            ProviderState::Failed
        }
    }
}
