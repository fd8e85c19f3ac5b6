//! HTTP handlers

use axum::{body::Bytes, extract::State, Json};
use docfreq_core::{DocumentRequest, FrequencyReport};
use serde_json::{json, Value};
use tracing::debug;

use crate::app::AppState;
use crate::error::ApiError;

/// `POST /document`
///
/// Body: `{"document": "...", "duration_seconds": n}`. Unknown fields are
/// rejected. Responds with the frequency report once a worker has produced
/// it, or straight from the cache for a document seen recently.
pub async fn submit_document(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<FrequencyReport>, ApiError> {
    let request: DocumentRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("invalid request body: {}", e)))?;

    if request.document.is_empty() {
        return Err(ApiError::BadRequest("invalid document".to_string()));
    }

    debug!(
        "Received document of {} bytes, duration {}s",
        request.document.len(),
        request.duration_seconds
    );

    let cancel = state.shutdown.child_token();
    let report = state.dispatcher.submit(request, &cancel).await?;
    Ok(Json(report))
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
