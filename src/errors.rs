use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::kong::KongError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("incomplete reference: {0}")]
    IncompleteReference(String),

    #[error("reference not found")]
    ReferenceNotFound,

    #[error("api reference {0} is not synchronized")]
    ApiNotSynchronized(uuid::Uuid),

    #[error("consumer reference {0} is not synchronized")]
    ConsumerNotSynchronized(uuid::Uuid),

    #[error(transparent)]
    Kong(#[from] KongError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, code, msg) = match &self {
            AppError::IncompleteReference(reason) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "incomplete_reference",
                reason.clone(),
            ),
            AppError::ReferenceNotFound => (
                StatusCode::NOT_FOUND,
                "invalid_request_error",
                "reference_not_found",
                "no reference with that id".to_string(),
            ),
            AppError::ApiNotSynchronized(id) => (
                StatusCode::CONFLICT,
                "invalid_request_error",
                "api_not_synchronized",
                format!("api reference {id} must be synchronized first"),
            ),
            AppError::ConsumerNotSynchronized(id) => (
                StatusCode::CONFLICT,
                "invalid_request_error",
                "consumer_not_synchronized",
                format!("consumer reference {id} must be synchronized first"),
            ),
            AppError::Kong(KongError::NotFound(body)) => (
                StatusCode::BAD_GATEWAY,
                "gateway_error",
                "kong_not_found",
                format!("kong does not know that resource: {body}"),
            ),
            AppError::Kong(KongError::Conflict(body)) => (
                StatusCode::CONFLICT,
                "gateway_error",
                "kong_conflict",
                format!("kong rejected the request as conflicting: {body}"),
            ),
            AppError::Kong(e) => {
                tracing::warn!("kong admin call failed: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "gateway_error",
                    "kong_unavailable",
                    e.to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal_server_error",
                    "internal server error".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal_server_error",
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "message": msg,
                "type": error_type,
                "code": code,
            }
        }));

        (status, body).into_response()
    }
}
