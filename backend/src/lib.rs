//! # Service Compare Backend
//!
//! Side-by-side booking comparison for two services.
//!
//! Given two service ids, the crate counts each service's bookings in the
//! `completed`, `ongoing` and `upcoming` states, split into organic
//! (marketing source mentions Instagram) and non-organic, computes the
//! pairwise differences and resolves each service owner's username. Results
//! are served as an HTML dashboard and as JSON through Axum.
//!
//! ## Architecture
//!
//! - [`api`]: identifiers and result types shared by every layer
//! - [`db`]: repository pattern, query executor, connection providers and configuration
//! - [`services`]: aggregation, owner resolution and the comparison report
//! - [`http`]: Axum-based HTTP server, HTML rendering and JSON endpoints
//! - [`models`]: shared macros
//!
//! ## Connection model
//!
//! Every statement opens a fresh database connection through a
//! [`db::ConnectionProvider`], either straight to the database host or
//! through an SSH port forward owned by [`db::TunnelProvider`].

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;

pub mod db;
pub mod models;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;

#[cfg(test)]
mod api_tests;
