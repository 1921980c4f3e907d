//! HTTP API over the aggregator
//!
//! Routes:
//! - `GET /` - liveness message
//! - `GET /health` - status and configured platforms
//! - `GET /compare` - all platforms, merged and summarized
//! - `GET /search/{platform}` - one platform, raw

mod error;
mod routes;

pub use error::ApiError;

use crate::aggregate::Aggregator;
use crate::config::SearchConfig;
use anyhow::Context;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
    pub default_max_results: usize,
    pub max_results_limit: usize,
}

impl AppState {
    pub fn new(aggregator: Arc<Aggregator>, search: &SearchConfig) -> Self {
        Self {
            aggregator,
            default_max_results: search.default_max_results,
            max_results_limit: search.max_results_limit,
        }
    }
}

/// Builds the API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::root_handler))
        .route("/health", get(routes::health_handler))
        .route("/compare", get(routes::compare_handler))
        .route("/search/:platform", get(routes::search_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the router until the process is stopped
///
/// # Arguments
///
/// * `router` - The API router
/// * `bind` - Socket address, e.g. "0.0.0.0:8000"
pub async fn serve(router: Router, bind: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind to {}", bind))?;

    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router)
        .await
        .context("Server error")?;

    Ok(())
}
