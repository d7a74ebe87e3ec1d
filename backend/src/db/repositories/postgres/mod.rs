//! Postgres repository implementation using Diesel.
//!
//! The repository only reads. Every statement goes through the
//! [`QueryExecutor`], which opens a connection per statement through the
//! injected connection provider (direct or SSH tunnel).
//!
//! ## Configuration
//!
//! See [`DatabaseSettings::from_env`] for the environment variables.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Array, BigInt, Text};

use crate::api::{ServiceBookingCounts, ServiceId};
use crate::db::config::DatabaseSettings;
use crate::db::connection::{ConnectionProvider, ProviderState};
use crate::db::repository::{BookingRepository, RepositoryResult};
use crate::services::attribution::{COUNTED_STATUSES, ORGANIC_SOURCE_PATTERN};

mod executor;
mod queries;

pub use executor::QueryExecutor;
use queries::*;

/// Diesel-backed repository for Postgres.
#[derive(Clone)]
pub struct PostgresRepository {
    executor: QueryExecutor,
}

impl PostgresRepository {
    /// Create a repository. No connection is opened until the first query.
    pub fn new(settings: DatabaseSettings, provider: Arc<dyn ConnectionProvider>) -> Self {
        Self {
            executor: QueryExecutor::new(settings, provider),
        }
    }

    pub fn executor(&self) -> &QueryExecutor {
        &self.executor
    }
}

fn counted_statuses() -> Vec<String> {
    COUNTED_STATUSES.iter().map(|s| s.to_string()).collect()
}

#[async_trait]
impl BookingRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.executor
            .execute("health_check", |conn| {
                sql_query("SELECT 1").execute(conn).map(|_| true)
            })
            .await
    }

    async fn booking_counts(
        &self,
        first: ServiceId,
        second: ServiceId,
    ) -> RepositoryResult<Vec<ServiceBookingCounts>> {
        let rows = self
            .executor
            .execute("booking_counts", move |conn| {
                sql_query(BOOKING_COUNTS_SQL)
                    .bind::<BigInt, _>(first.value())
                    .bind::<BigInt, _>(second.value())
                    .bind::<Text, _>(ORGANIC_SOURCE_PATTERN)
                    .bind::<Array<Text>, _>(counted_statuses())
                    .load::<BookingCountsRow>(conn)
            })
            .await?;

        Ok(rows.into_iter().map(ServiceBookingCounts::from).collect())
    }

    async fn owner_username(&self, service_id: ServiceId) -> RepositoryResult<Option<String>> {
        let rows = self
            .executor
            .execute("owner_username", move |conn| {
                sql_query(OWNER_USERNAME_SQL)
                    .bind::<BigInt, _>(service_id.value())
                    .load::<OwnerRow>(conn)
            })
            .await?;

        Ok(rows.into_iter().next().and_then(|row| row.username))
    }

    fn connection_state(&self) -> ProviderState {
        self.executor.provider_state()
    }

    fn shutdown(&self) {
        self.executor.shutdown();
    }
}
