//! HTTP error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message returned for blank questions.
pub const EMPTY_MESSAGE_DETAIL: &str = "Mensagem não pode estar vazia";
/// Message returned when every model failed.
pub const UPSTREAM_DETAIL: &str = "Erro ao conectar com o serviço de IA";
/// Message returned for unexpected faults.
pub const INTERNAL_DETAIL: &str = "Erro no servidor";

/// Errors a request handler can return.
///
/// Upstream and internal details are logged, never sent to the caller.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The question is empty or whitespace-only
    #[error("Empty message")]
    EmptyMessage,

    /// Every candidate model failed
    #[error("All models failed: {0}")]
    UpstreamUnavailable(String),

    /// Unexpected fault while handling the request
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            Self::EmptyMessage => (StatusCode::BAD_REQUEST, EMPTY_MESSAGE_DETAIL),
            Self::UpstreamUnavailable(last_error) => {
                tracing::error!(error = %last_error, "Completion service unavailable");
                (StatusCode::BAD_GATEWAY, UPSTREAM_DETAIL)
            }
            Self::Internal(message) => {
                tracing::error!(error = %message, "Unexpected error");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_DETAIL)
            }
        };

        (
            status,
            Json(ErrorResponse {
                detail: detail.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_per_variant() {
        assert_eq!(
            ApiError::EmptyMessage.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::UpstreamUnavailable("m1: Status 500".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::Internal("join error".to_string())
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn upstream_detail_is_not_leaked() {
        let response = ApiError::UpstreamUnavailable("m1: invalid api key gsk_123".to_string())
            .into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(error.detail, UPSTREAM_DETAIL);
    }
}
