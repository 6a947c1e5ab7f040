//! Axum HTTP API server.
//!
//! This crate provides:
//! - Job submission and polling endpoints over the pipeline
//! - The synchronous direct-URL analysis endpoint
//! - Rate limiting and security headers
//! - Health and readiness probes

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod security;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
