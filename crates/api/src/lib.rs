//! # StudyHall API
//!
//! HTTP surface of the student management backend.
//!
//! This crate contains:
//! - The axum router and request handlers
//! - Error-to-status mapping at the transport boundary
//! - Application state wiring

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

// Re-export commonly used items
pub use routes::router;
pub use state::AppState;
