//! API Server - HTTP server for the classifier

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers;
use crate::error::Result;
use crate::state::AppState;

/// HTTP front end for a shared model
pub struct ApiServer {
    state: Arc<AppState>,
    addr: String,
}

impl ApiServer {
    pub fn new(state: AppState, addr: String) -> Self {
        Self {
            state: Arc::new(state),
            addr,
        }
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Build the router with all routes
    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    /// Start the API server
    pub async fn run(&self) -> Result<()> {
        let router = self.router();

        info!("Starting API server on {}", self.addr);

        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}

/// Routes for `state`, with CORS open to any origin
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/predict", post(handlers::predict))
        .route("/train", post(handlers::train))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
