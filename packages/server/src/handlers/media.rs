use std::time::Duration;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use sea_orm::Set;
use tracing::instrument;

use crate::entity::media;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AdminOnly, Requester};
use crate::extractors::json::AppJson;
use crate::extractors::multipart::FileUpload;
use crate::extractors::path::RecordId;
use crate::models::media::{MediaIn, MediaOut};
use crate::models::shared::ObjectUrl;
use crate::state::AppState;
use crate::upload::{object_url, upload_object};
use crate::utils::authorization::{list_for, require_read_access};
use crate::utils::crud::{create_entry, delete_entry, fetch_all, get_entry, update_entry};

#[utoipa::path(
    post,
    path = "/",
    tag = "Media",
    operation_id = "createMedia",
    summary = "Register a media",
    description = "Creates an empty media record. Content is attached afterwards with the upload route.",
    request_body = MediaIn,
    responses(
        (status = 201, description = "Media created", body = MediaOut),
        (status = 401, description = "Unauthorized (NOT_AUTHENTICATED, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (SCOPE_MISMATCH)", body = ErrorBody),
        (status = 422, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _requester, payload))]
pub async fn create_media(
    _requester: Requester<AdminOnly>,
    State(state): State<AppState>,
    AppJson(payload): AppJson<MediaIn>,
) -> Result<impl IntoResponse, AppError> {
    let new_media = media::ActiveModel {
        kind: Set(payload.kind),
        bucket_key: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let entry = create_entry(&state.db, new_media).await?;
    Ok((StatusCode::CREATED, Json(MediaOut::from(entry))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Media",
    operation_id = "getMedia",
    summary = "Get a media by ID",
    description = "Only admin accesses may read media records.",
    params(("id" = i32, Path, description = "Media ID")),
    responses(
        (status = 200, description = "Media details", body = MediaOut),
        (status = 401, description = "Unauthorized (NOT_AUTHENTICATED, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (SCOPE_MISMATCH, READ_FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Media not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, requester), fields(id, access_id = requester.id()))]
pub async fn get_media(
    requester: Requester,
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Json<MediaOut>, AppError> {
    require_read_access(&state.db, requester.id()).await?;

    let entry = get_entry::<media::Entity, _>(&state.db, id).await?;
    Ok(Json(entry.into()))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Media",
    operation_id = "listMedia",
    summary = "List all media",
    description = "Admins get every media in creation order. Other accesses get an empty list.",
    responses(
        (status = 200, description = "Visible media", body = Vec<MediaOut>),
        (status = 401, description = "Unauthorized (NOT_AUTHENTICATED, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (SCOPE_MISMATCH)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, requester), fields(access_id = requester.id()))]
pub async fn list_media(
    requester: Requester,
    State(state): State<AppState>,
) -> Result<Json<Vec<MediaOut>>, AppError> {
    let entries = list_for(&state.db, requester.id(), || {
        fetch_all::<media::Entity, _>(&state.db)
    })
    .await?;

    Ok(Json(entries.into_iter().map(MediaOut::from).collect()))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Media",
    operation_id = "updateMedia",
    summary = "Update a media",
    params(("id" = i32, Path, description = "Media ID")),
    request_body = MediaIn,
    responses(
        (status = 200, description = "Media updated", body = MediaOut),
        (status = 401, description = "Unauthorized (NOT_AUTHENTICATED, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (SCOPE_MISMATCH)", body = ErrorBody),
        (status = 404, description = "Media not found (NOT_FOUND)", body = ErrorBody),
        (status = 422, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _requester, payload), fields(id))]
pub async fn update_media(
    _requester: Requester<AdminOnly>,
    State(state): State<AppState>,
    RecordId(id): RecordId,
    AppJson(payload): AppJson<MediaIn>,
) -> Result<Json<MediaOut>, AppError> {
    let entry = get_entry::<media::Entity, _>(&state.db, id).await?;
    let mut active: media::ActiveModel = entry.into();
    active.kind = Set(payload.kind);

    let updated = update_entry(&state.db, active).await?;
    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Media",
    operation_id = "deleteMedia",
    summary = "Delete a media",
    description = "Media still referenced by annotations cannot be deleted. The bucket object is kept.",
    params(("id" = i32, Path, description = "Media ID")),
    responses(
        (status = 200, description = "Deleted media", body = MediaOut),
        (status = 401, description = "Unauthorized (NOT_AUTHENTICATED, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (SCOPE_MISMATCH)", body = ErrorBody),
        (status = 404, description = "Media not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Media still annotated (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _requester), fields(id))]
pub async fn delete_media(
    _requester: Requester<AdminOnly>,
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Json<MediaOut>, AppError> {
    let entry = delete_entry::<media::Entity, _>(&state.db, id).await?;
    Ok(Json(entry.into()))
}

#[utoipa::path(
    post,
    path = "/{id}/upload",
    tag = "Media",
    operation_id = "uploadMedia",
    summary = "Upload the content of a media",
    description = "Stores the `file` multipart field under a content-addressed key and verifies \
        it by reading it back. Uploading the same bytes again is a no-op.",
    params(("id" = i32, Path, description = "Media ID")),
    request_body(content_type = "multipart/form-data", description = "Image or video file"),
    responses(
        (status = 200, description = "Media with verified content", body = MediaOut),
        (status = 401, description = "Unauthorized (NOT_AUTHENTICATED, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (SCOPE_MISMATCH)", body = ErrorBody),
        (status = 404, description = "Media not found (NOT_FOUND)", body = ErrorBody),
        (status = 422, description = "Missing or oversized file (VALIDATION_ERROR)", body = ErrorBody),
        (status = 500, description = "UPLOAD_FAILED, INTEGRITY_CHECK_FAILED, DATA_CORRUPTED", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, requester, file), fields(id, access_id = requester.id(), file_name = %file.file_name))]
pub async fn upload_media(
    requester: Requester,
    State(state): State<AppState>,
    RecordId(id): RecordId,
    FileUpload(file): FileUpload,
) -> Result<Json<MediaOut>, AppError> {
    let entry = upload_object::<media::Entity, _>(
        &state.db,
        state.bucket.as_ref(),
        state.config.bucket.media_folder.as_deref(),
        id,
        &file,
    )
    .await?;

    Ok(Json(entry.into()))
}

#[utoipa::path(
    get,
    path = "/{id}/url",
    tag = "Media",
    operation_id = "getMediaUrl",
    summary = "Get a temporary URL to the media content",
    description = "Only admin accesses may read media content.",
    params(("id" = i32, Path, description = "Media ID")),
    responses(
        (status = 200, description = "Presigned URL", body = ObjectUrl),
        (status = 401, description = "Unauthorized (NOT_AUTHENTICATED, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (SCOPE_MISMATCH, READ_FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Media or content not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, requester), fields(id, access_id = requester.id()))]
pub async fn get_media_url(
    requester: Requester,
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Json<ObjectUrl>, AppError> {
    require_read_access(&state.db, requester.id()).await?;

    let entry = get_entry::<media::Entity, _>(&state.db, id).await?;
    let url = object_url(
        state.bucket.as_ref(),
        entry.bucket_key.as_deref(),
        Duration::from_secs(state.config.bucket.url_expiration_secs),
    )
    .await?;

    Ok(Json(ObjectUrl { url }))
}
