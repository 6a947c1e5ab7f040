//! API routes.

use std::sync::Arc;

use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::analyze::analyze_url;
use crate::handlers::health::{health, ready};
use crate::handlers::jobs::{cancel_job, get_job_progress, get_job_result, submit_job};
use crate::middleware::{
    cors_layer, rate_limit_middleware, request_id, request_logging, security_headers,
    RateLimiterCache,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let job_routes = Router::new()
        // Submit a video to the pipeline
        .route("/jobs", post(submit_job))
        // Poll progress
        .route("/jobs/:handle/progress", get(get_job_progress))
        // Fetch the terminal report
        .route("/jobs/:handle/result", get(get_job_result))
        // Cancel a running job
        .route("/jobs/:handle", delete(cancel_job))
        // Synchronous direct-URL analysis
        .route("/analyze-url", post(analyze_url));

    let rate_limiter = Arc::new(RateLimiterCache::new(state.config.rate_limit_rps));

    let api_routes = job_routes.layer(middleware::from_fn_with_state(
        rate_limiter,
        rate_limit_middleware,
    ));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        // Submissions are small JSON bodies; anything larger is abuse
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
