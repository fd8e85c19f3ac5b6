//! Router construction

use axum::{
    routing::{get, post},
    Router,
};
use docfreq_dispatch::Dispatcher;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Shared state of the HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,

    /// Cancelled when the server shuts down; waiting requests give up
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(dispatcher: Arc<Dispatcher>, shutdown: CancellationToken) -> Self {
        Self {
            dispatcher,
            shutdown,
        }
    }
}

/// Build the API router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/document", post(handlers::submit_document))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
