//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`]: domain-level validation errors
//! - [`error::PlanningError`]: the cause attached to a failed or cancelled run

pub mod error;
