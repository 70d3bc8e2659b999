//! HTTP request handlers.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::dispatcher::DispatchResult;

use super::error::ApiError;
use super::state::AppState;

/// Body of `POST /api/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// A missing field is treated like an empty question
    #[serde(default)]
    pub text: String,
}

/// Successful answer.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub status: String,
}

/// Body of `GET /api/health`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub dataset_loaded: bool,
    pub provider: String,
}

/// POST /api/chat
///
/// Rejects blank questions, then runs the dispatcher on a blocking worker so
/// outbound calls and backoff sleeps never stall the async executor.
///
/// If the request is dropped (client disconnect or timeout), the worker stops
/// before its next outbound call.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if request.text.trim().is_empty() {
        return Err(ApiError::EmptyMessage);
    }

    tracing::info!(question = %request.text, "Question received");

    let cancel = CancellationToken::new();
    // Fires when this future is dropped
    let _cancel_on_drop = cancel.clone().drop_guard();

    let worker_state = Arc::clone(&state);
    let result = tokio::task::spawn_blocking(move || {
        worker_state.dispatcher.dispatch_prompts_until_cancelled(
            &request.text,
            &worker_state.prompts,
            &cancel,
        )
    })
    .await
    .map_err(|e| ApiError::Internal(format!("dispatch task failed: {e}")))?;

    match result {
        DispatchResult::Success {
            text,
            model,
            variant,
        } => {
            tracing::info!(%model, %variant, "Answer sent");
            Ok(Json(ChatResponse {
                response: text,
                status: "success".to_string(),
            }))
        }
        DispatchResult::Exhausted { last_error } => Err(ApiError::UpstreamUnavailable(last_error)),
        DispatchResult::Cancelled => Err(ApiError::Internal("dispatch cancelled".to_string())),
    }
}

/// GET /api/health
///
/// Informational only; never calls the completion service.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        dataset_loaded: state.dataset_loaded,
        provider: state.provider.clone(),
    })
}
