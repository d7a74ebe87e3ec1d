//! Repository implementations module.
//!
//! This module contains the implementations of the `BookingRepository` trait:
//! - `postgres`: PostgreSQL implementation with Diesel, one connection per statement
//! - `local`: In-memory implementation for unit testing and local development
pub mod local;
#[cfg(feature = "postgres-repo")]
pub mod postgres;

pub use local::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use postgres::{PostgresRepository, QueryExecutor};
