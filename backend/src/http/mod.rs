//! HTTP server module.
//!
//! This module provides an axum-based HTTP server that serves the comparison
//! dashboard as HTML and the same data as JSON. It reuses the service layer
//! and the repository pattern from the core library.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - Query parsing and validation                           │
//! │  - HTML rendering / JSON serialization                    │
//! │  - Compression, tracing, error mapping                    │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Service Layer (crate::services)                          │
//! │  - Aggregation, owner resolution, report                  │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Repository Layer (crate::db)                             │
//! │  - LocalRepository / PostgresRepository                   │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod dto;
pub mod error;
pub mod handlers;
pub mod render;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
