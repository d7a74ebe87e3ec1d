//! Query executor: one connection per statement.

use std::sync::Arc;

use diesel::pg::PgConnection;
use diesel::prelude::*;
use log::debug;
use tokio::task;

use crate::db::config::DatabaseSettings;
use crate::db::connection::{ConnectionProvider, Endpoint, ProviderState};
use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult};

/// Runs Diesel statements against the endpoint handed out by a [`ConnectionProvider`].
///
/// Each call acquires an endpoint, opens a fresh `PgConnection`, runs the
/// statement and drops the connection before returning, whether the
/// statement succeeded or not. Nothing is retried.
#[derive(Clone)]
pub struct QueryExecutor {
    provider: Arc<dyn ConnectionProvider>,
    settings: DatabaseSettings,
}

impl QueryExecutor {
    pub fn new(settings: DatabaseSettings, provider: Arc<dyn ConnectionProvider>) -> Self {
        Self { provider, settings }
    }

    pub fn provider_state(&self) -> ProviderState {
        self.provider.state()
    }

    pub fn shutdown(&self) {
        self.provider.shutdown();
    }

    /// Execute `statement` on a fresh connection.
    ///
    /// Blocking work (tunnel start, connect, query) runs on the blocking pool.
    pub async fn execute<T, F>(&self, operation: &'static str, statement: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> QueryResult<T> + Send + 'static,
    {
        let provider = Arc::clone(&self.provider);
        let settings = self.settings.clone();

        task::spawn_blocking(move || {
            let endpoint = provider
                .acquire()
                .map_err(|e| e.with_operation(operation))?;
            let result = run_statement(&settings, &endpoint, operation, statement);
            provider.release(&endpoint);
            result
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }
}

fn run_statement<T, F>(
    settings: &DatabaseSettings,
    endpoint: &Endpoint,
    operation: &str,
    statement: F,
) -> RepositoryResult<T>
where
    F: FnOnce(&mut PgConnection) -> QueryResult<T>,
{
    let mut conn = PgConnection::establish(&settings.connection_string(endpoint)).map_err(|e| {
        RepositoryError::connection_with_context(
            format!("Failed to connect to database: {}", e),
            ErrorContext::new(operation)
                .with_entity("database")
                .with_entity_id(format!("{}/{}", endpoint, settings.name)),
        )
    })?;

    debug!("Executing {} on {}", operation, endpoint);
    statement(&mut conn).map_err(|e| RepositoryError::from(e).with_operation(operation))
}
