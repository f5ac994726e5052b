//! HTTP handlers
//!
//! Axum request handlers for the API endpoints.

pub mod health;
pub mod orders;

pub use health::{liveness, readiness};
pub use orders::{create_order, get_order};
