use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::database::DatabaseError;
use crate::lookup::LookupError;
use crate::session::StoreError;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Lookup(LookupError::Validation(msg)) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Lookup(LookupError::NotFound(msg)) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Lookup(LookupError::Configuration(var)) => {
                tracing::error!("Lookup is not configured: {} is not set", var);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "External service is not configured".to_string(),
                )
            }
            AppError::Lookup(LookupError::Upstream(detail)) => {
                tracing::error!("Upstream lookup failed: {}", detail);
                (
                    StatusCode::BAD_GATEWAY,
                    "External service request failed".to_string(),
                )
            }
            AppError::Database(DatabaseError::InvalidData(msg)) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Database(err) => {
                tracing::error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal database error".to_string(),
                )
            }
            AppError::Store(err) => {
                tracing::error!("Session store error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Session storage error".to_string(),
                )
            }
        };

        (status, axum::Json(ErrorResponse { error: message })).into_response()
    }
}
