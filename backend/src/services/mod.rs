//! Service layer for business logic and orchestration.
//!
//! Services sit between the repositories and the HTTP layer. They work with
//! any [`BookingRepository`](crate::db::repository::BookingRepository)
//! implementation and perform no error recovery of their own.

pub mod attribution;
pub mod compare;
pub mod owner;
pub mod report;


pub use compare::compare_services;
pub use owner::resolve_owner;
pub use report::build_comparison;
