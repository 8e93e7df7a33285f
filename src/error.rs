use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::licensing::DenialReason;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The license cannot be used for the requested operation.
    #[error("License denied: {0}")]
    Denied(DenialReason),

    #[error("Activation limit reached (max {max})")]
    LimitExceeded { max: i64 },

    #[error("Update token expired")]
    TokenExpired,

    /// A release points at an artifact the blob store does not have.
    #[error("Artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Stored data is malformed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    ok: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ErrorResponse {
    fn error(error: &'static str) -> Self {
        Self {
            ok: None,
            error: Some(error),
            reason: None,
            max: None,
            details: None,
        }
    }

    fn rejected(reason: &'static str) -> Self {
        Self {
            ok: Some(false),
            error: None,
            reason: Some(reason),
            max: None,
            details: None,
        }
    }
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

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let internal = || {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::error("internal_error"),
            )
        };

        let (status, body) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorResponse::error("not_found")),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    details: Some(msg.clone()),
                    ..ErrorResponse::rejected("invalid_request")
                },
            ),
            AppError::Denied(reason) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::rejected(reason.as_str()))
            }
            AppError::LimitExceeded { max } => (
                StatusCode::CONFLICT,
                ErrorResponse {
                    max: Some(*max),
                    ..ErrorResponse::rejected("limit_exceeded")
                },
            ),
            AppError::TokenExpired => (
                StatusCode::FORBIDDEN,
                ErrorResponse {
                    ok: Some(false),
                    ..ErrorResponse::error("token_expired")
                },
            ),
            AppError::ArtifactNotFound(_) => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    ok: Some(false),
                    ..ErrorResponse::error("file_not_found")
                },
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                internal()
            }
            AppError::Pool(e) => {
                tracing::error!("Pool error: {}", e);
                internal()
            }
            AppError::Json(e) => {
                tracing::error!("Malformed stored JSON: {}", e);
                internal()
            }
            AppError::Io(e) => {
                tracing::error!("Storage error: {}", e);
                internal()
            }
            AppError::Url(e) => {
                tracing::error!("URL error: {}", e);
                internal()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                internal()
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
