use axum::extract::{FromRequest, Multipart, Request};

use crate::error::AppError;
use crate::upload::UploadedFile;

/// The `file` field of a `multipart/form-data` upload.
///
/// Every multipart failure, including a body over the configured size
/// limit, is reported as 422 `VALIDATION_ERROR`.
pub struct FileUpload(pub UploadedFile);

impl<S> FromRequest<S> for FileUpload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
        {
            if field.name() != Some("file") {
                continue; // Ignore unknown fields.
            }

            let file_name = field
                .file_name()
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .ok_or_else(|| AppError::Validation("File field must have a filename".into()))?;
            let content_type = mime_guess::from_path(&file_name)
                .first()
                .map(|m| m.to_string())
                .or_else(|| field.content_type().map(str::to_string));
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read file: {e}")))?;

            return Ok(FileUpload(UploadedFile {
                file_name,
                content_type,
                data: data.to_vec(),
            }));
        }

        Err(AppError::Validation("Missing 'file' field".into()))
    }
}
