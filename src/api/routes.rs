//! API route configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use super::handlers::{self, AppState};
use super::middleware::logging_middleware;

/// Create the API router with all routes and middleware.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Risk scoring core
        .route("/risk-score", post(handlers::risk_score))
        .route("/assessment/:hash", get(handlers::get_assessment))
        .route("/stats", get(handlers::get_stats))
        .route("/alerts", get(handlers::get_alerts))
        .route("/alerts/stream", get(handlers::stream_alerts))
        .route("/simulate-exploit", post(handlers::simulate_exploit))
        // AI provider surface
        .route("/ai/status", get(handlers::ai_status))
        .route("/ai/analyze", post(handlers::ai_analyze))
        .route("/ai/providers", get(handlers::ai_providers))
        // TransactionGuard contract passthrough
        .route("/blockchain/update-risk", post(handlers::chain_update_risk))
        .route(
            "/blockchain/batch-update-risk",
            post(handlers::chain_batch_update_risk),
        )
        .route("/blockchain/risk/:address", get(handlers::chain_risk))
        .route("/blockchain/safe/:hash", get(handlers::chain_safe))
        .route("/blockchain/stats", get(handlers::chain_stats))
        // BlockDAG passthrough
        .route(
            "/blockdag/transaction/:hash",
            get(handlers::blockdag_transaction),
        )
        .route("/blockdag/transaction", post(handlers::blockdag_submit))
        .route("/blockdag/stats", get(handlers::blockdag_stats))
        .route(
            "/blockdag/risk-profile",
            post(handlers::blockdag_update_profile),
        )
        .route(
            "/blockdag/risk-profile/:address",
            get(handlers::blockdag_profile),
        )
        .route("/blockdag/health", get(handlers::blockdag_health))
        .route("/blockdag/dag/tips", get(handlers::blockdag_tips))
        .route("/blockdag/dag/validate", get(handlers::blockdag_validate));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(cors)
                .layer(middleware::from_fn(logging_middleware)),
        )
}
