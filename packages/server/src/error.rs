use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;

use crate::upload::UploadError;
use crate::utils::jwt::TokenError;

pub const SCOPE_MISMATCH_DETAIL: &str = "Your access scope is not compatible with this operation.";
pub const READ_FORBIDDEN_DETAIL: &str = "This access can't read resources";
pub const MISSING_OBJECT_DETAIL: &str = "File cannot be found on the bucket storage";

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `NOT_AUTHENTICATED`, `TOKEN_INVALID`,
    /// `INVALID_CREDENTIALS`, `VALIDATION_ERROR`, `SCOPE_MISMATCH`, `READ_FORBIDDEN`,
    /// `NOT_FOUND`, `CONFLICT`, `UPLOAD_FAILED`, `INTEGRITY_CHECK_FAILED`,
    /// `DATA_CORRUPTED`, `INTERNAL_ERROR`.
    #[schema(example = "NOT_FOUND")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Table media has no entry with id=999")]
    pub detail: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    /// No bearer token was supplied.
    NotAuthenticated,
    /// The token signature, structure or expiry is invalid.
    TokenInvalid,
    InvalidCredentials,
    /// Malformed input, malformed token claims, or a reference to a missing entity.
    Validation(String),
    /// None of the token's scopes is accepted by the route.
    ScopeMismatch,
    /// The caller may invoke the route but not read the resource.
    ReadForbidden,
    NotFound(String),
    Conflict(String),
    Upload,
    Integrity,
    Corruption,
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        let (status, code, detail) = match self {
            AppError::NotAuthenticated => (
                StatusCode::UNAUTHORIZED,
                "NOT_AUTHENTICATED",
                "Not authenticated".to_string(),
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_INVALID",
                "Invalid or expired token.".to_string(),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Incorrect username or password.".to_string(),
            ),
            AppError::Validation(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR", msg)
            }
            AppError::ScopeMismatch => (
                StatusCode::FORBIDDEN,
                "SCOPE_MISMATCH",
                SCOPE_MISMATCH_DETAIL.to_string(),
            ),
            AppError::ReadForbidden => (
                StatusCode::FORBIDDEN,
                "READ_FORBIDDEN",
                READ_FORBIDDEN_DETAIL.to_string(),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            AppError::Upload => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "UPLOAD_FAILED",
                "Failed upload".to_string(),
            ),
            AppError::Integrity => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTEGRITY_CHECK_FAILED",
                "The data integrity check failed (unable to download media from bucket)"
                    .to_string(),
            ),
            AppError::Corruption => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATA_CORRUPTED",
                "Data was corrupted during upload".to_string(),
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An unexpected error occurred".to_string(),
                )
            }
        };
        (status, ErrorBody { code, detail })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();

        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], Json(body)).into_response()
        } else {
            (status, Json(body)).into_response()
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                tracing::debug!("Unique constraint violation: {detail}");
                AppError::Conflict("An entry with the same unique key already exists.".into())
            }
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                tracing::debug!("Foreign key violation: {detail}");
                AppError::Validation("Payload refers to a nonexistent entry.".into())
            }
            _ => AppError::Internal(err.to_string()),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid(e) => {
                tracing::debug!("Token rejected: {e}");
                AppError::TokenInvalid
            }
            TokenError::Payload(msg) => {
                tracing::debug!("Token payload rejected: {msg}");
                AppError::Validation("Invalid token payload.".into())
            }
            TokenError::Signing(e) => AppError::Internal(format!("Token signing failed: {e}")),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => {
                tracing::warn!(key, "Object missing from bucket");
                AppError::NotFound(MISSING_OBJECT_DETAIL.into())
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        let mapped = match &err {
            UploadError::KeyTooLong { .. } => {
                return AppError::Validation(format!("File name is too long: {err}"));
            }
            UploadError::Upload { .. } => AppError::Upload,
            UploadError::Integrity { .. } => AppError::Integrity,
            UploadError::Corruption { .. } => AppError::Corruption,
        };
        tracing::error!("Upload pipeline failed: {err}");
        mapped
    }
}
