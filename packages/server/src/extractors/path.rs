use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::error::AppError;

/// A positive record id taken from the `{id}` path segment.
#[derive(Debug, Clone, Copy)]
pub struct RecordId(pub i32);

impl<S> FromRequestParts<S> for RecordId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i32>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        validate_id(id)?;
        Ok(RecordId(id))
    }
}

/// Ids are server-assigned and always positive.
pub fn validate_id(id: i32) -> Result<(), AppError> {
    if id <= 0 {
        return Err(AppError::Validation(format!(
            "Id must be a positive integer, got {id}"
        )));
    }
    Ok(())
}
