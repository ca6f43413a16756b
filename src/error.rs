use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;
use crate::validation::FieldError;

/// Errors a handler can return. Each variant maps to a response with the
/// standard `success: false` envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn character_not_found() -> Self {
        ApiError::NotFound("Character not found".to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::NotFound(_) => ApiError::character_not_found(),
            StoreError::DuplicateName(_) => {
                ApiError::Conflict("A character with that name already exists".to_string())
            }
            StoreError::Poisoned => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<Vec<FieldError>> for ApiError {
    fn from(errors: Vec<FieldError>) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<FieldError> for ApiError {
    fn from(error: FieldError) -> Self {
        ApiError::Validation(vec![error])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "success": false,
                    "message": "Validation errors",
                    "errors": errors,
                })),
            )
                .into_response(),
            ApiError::BadRequest(message) => envelope(StatusCode::BAD_REQUEST, &message),
            ApiError::NotFound(message) => envelope(StatusCode::NOT_FOUND, &message),
            ApiError::Conflict(message) => envelope(StatusCode::CONFLICT, &message),
            ApiError::Internal(detail) => {
                tracing::error!("internal error: {detail}");
                let mut body = json!({
                    "success": false,
                    "message": "Internal server error",
                });
                // Debug builds surface the underlying description.
                if cfg!(debug_assertions) {
                    body["error"] = json!(detail);
                }
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

fn envelope(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({
            "success": false,
            "message": message,
            "data": null,
        })),
    )
        .into_response()
}
