//! Database module for booking data access.
//!
//! This module provides abstractions for database operations via the Repository pattern,
//! allowing different storage backends to be swapped easily.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP layer / crate::services (compare, owner, report)   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Trait (repository) - BookingRepository       │
//! └───────────────────┬─────────────────────────────────────┘
//!           ┌─────────┴──────────────┐
//! ┌─────────▼──────────┐   ┌─────────▼──────────┐
//! │ PostgresRepository │   │  LocalRepository   │
//! │  + QueryExecutor   │   │    (in-memory)     │
//! └─────────┬──────────┘   └────────────────────┘
//!           │
//! ┌─────────▼──────────────────────────────────┐
//! │ ConnectionProvider (direct | ssh tunnel)   │
//! └────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - `repository`: trait definition and error types
//! - `repositories::postgres`: Postgres implementation with Diesel
//! - `repositories::local`: in-memory implementation for tests and local development
//! - `connection`: endpoint providers and the tunnel state machine
//! - `config` / `repo_config`: settings from the environment or `repository.toml`
//! - `factory`: creating repository instances
//!
//! # Usage
//!
//! ```ignore
//! use service_compare::db::{DatabaseSettings, RepositoryFactory, RepositoryType};
//! use service_compare::api::ServiceId;
//! use service_compare::services::build_comparison;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = DatabaseSettings::from_env()?;
//!     let repo = RepositoryFactory::create(RepositoryType::Postgres, Some(&settings))?;
//!     let report = build_comparison(repo.as_ref(), ServiceId(101), ServiceId(202)).await?;
//!     println!("{}", report.owner_display);
//!     Ok(())
//! }
//! ```

#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod config;
pub mod connection;
pub mod factory;
pub mod models;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;

pub use services::{database_status, health_check, DatabaseStatus};

pub use config::{DatabaseSettings, DbMode, TunnelSettings};
pub use connection::{
    provider_for, ConnectionProvider, DirectProvider, Endpoint, ProviderState, TunnelProvider,
};
pub use repo_config::RepositoryConfig;

pub use factory::{RepositoryBuilder, RepositoryFactory, RepositoryType};
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::{PostgresRepository, QueryExecutor};
pub use repository::{
    BookingRepository, ErrorContext, ErrorKind, RepositoryError, RepositoryResult,
};
