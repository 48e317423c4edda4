use std::time::Duration;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use sea_orm::{ConnectionTrait, EntityTrait, Set};
use tracing::instrument;

use crate::entity::{annotation, media};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AdminOnly, Requester};
use crate::extractors::json::AppJson;
use crate::extractors::multipart::FileUpload;
use crate::extractors::path::{RecordId, validate_id};
use crate::models::annotation::{AnnotationIn, AnnotationOut};
use crate::models::shared::ObjectUrl;
use crate::state::AppState;
use crate::upload::{object_url, upload_object};
use crate::utils::authorization::{list_for, require_read_access};
use crate::utils::crud::{create_entry, delete_entry, fetch_all, get_entry, update_entry};

/// Reject payloads that point at a media which does not exist.
async fn check_media_reference<C: ConnectionTrait>(db: &C, media_id: i32) -> Result<(), AppError> {
    validate_id(media_id)?;
    if media::Entity::find_by_id(media_id).one(db).await?.is_none() {
        return Err(AppError::Validation(format!(
            "Payload refers to a nonexistent media with id={media_id}"
        )));
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Annotations",
    operation_id = "createAnnotation",
    summary = "Create an annotation of a media",
    request_body = AnnotationIn,
    responses(
        (status = 201, description = "Annotation created", body = AnnotationOut),
        (status = 401, description = "Unauthorized (NOT_AUTHENTICATED, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (SCOPE_MISMATCH)", body = ErrorBody),
        (status = 422, description = "Unknown media or invalid payload (VALIDATION_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, requester, payload), fields(media_id = payload.media_id, access_id = requester.id()))]
pub async fn create_annotation(
    requester: Requester,
    State(state): State<AppState>,
    AppJson(payload): AppJson<AnnotationIn>,
) -> Result<impl IntoResponse, AppError> {
    check_media_reference(&state.db, payload.media_id).await?;

    let new_annotation = annotation::ActiveModel {
        media_id: Set(payload.media_id),
        bucket_key: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let entry = create_entry(&state.db, new_annotation).await?;
    Ok((StatusCode::CREATED, Json(AnnotationOut::from(entry))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Annotations",
    operation_id = "getAnnotation",
    summary = "Get an annotation by ID",
    description = "Only admin accesses may read annotation records.",
    params(("id" = i32, Path, description = "Annotation ID")),
    responses(
        (status = 200, description = "Annotation details", body = AnnotationOut),
        (status = 401, description = "Unauthorized (NOT_AUTHENTICATED, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (SCOPE_MISMATCH, READ_FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Annotation not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, requester), fields(id, access_id = requester.id()))]
pub async fn get_annotation(
    requester: Requester,
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Json<AnnotationOut>, AppError> {
    require_read_access(&state.db, requester.id()).await?;

    let entry = get_entry::<annotation::Entity, _>(&state.db, id).await?;
    Ok(Json(entry.into()))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Annotations",
    operation_id = "listAnnotations",
    summary = "List all annotations",
    description = "Admins get every annotation in creation order. Other accesses get an empty list.",
    responses(
        (status = 200, description = "Visible annotations", body = Vec<AnnotationOut>),
        (status = 401, description = "Unauthorized (NOT_AUTHENTICATED, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (SCOPE_MISMATCH)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, requester), fields(access_id = requester.id()))]
pub async fn list_annotations(
    requester: Requester,
    State(state): State<AppState>,
) -> Result<Json<Vec<AnnotationOut>>, AppError> {
    let entries = list_for(&state.db, requester.id(), || {
        fetch_all::<annotation::Entity, _>(&state.db)
    })
    .await?;

    Ok(Json(entries.into_iter().map(AnnotationOut::from).collect()))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Annotations",
    operation_id = "updateAnnotation",
    summary = "Update an annotation",
    params(("id" = i32, Path, description = "Annotation ID")),
    request_body = AnnotationIn,
    responses(
        (status = 200, description = "Annotation updated", body = AnnotationOut),
        (status = 401, description = "Unauthorized (NOT_AUTHENTICATED, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (SCOPE_MISMATCH)", body = ErrorBody),
        (status = 404, description = "Annotation not found (NOT_FOUND)", body = ErrorBody),
        (status = 422, description = "Unknown media or invalid payload (VALIDATION_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _requester, payload), fields(id, media_id = payload.media_id))]
pub async fn update_annotation(
    _requester: Requester<AdminOnly>,
    State(state): State<AppState>,
    RecordId(id): RecordId,
    AppJson(payload): AppJson<AnnotationIn>,
) -> Result<Json<AnnotationOut>, AppError> {
    let entry = get_entry::<annotation::Entity, _>(&state.db, id).await?;
    check_media_reference(&state.db, payload.media_id).await?;

    let mut active: annotation::ActiveModel = entry.into();
    active.media_id = Set(payload.media_id);

    let updated = update_entry(&state.db, active).await?;
    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Annotations",
    operation_id = "deleteAnnotation",
    summary = "Delete an annotation",
    params(("id" = i32, Path, description = "Annotation ID")),
    responses(
        (status = 200, description = "Deleted annotation", body = AnnotationOut),
        (status = 401, description = "Unauthorized (NOT_AUTHENTICATED, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (SCOPE_MISMATCH)", body = ErrorBody),
        (status = 404, description = "Annotation not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _requester), fields(id))]
pub async fn delete_annotation(
    _requester: Requester<AdminOnly>,
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Json<AnnotationOut>, AppError> {
    let entry = delete_entry::<annotation::Entity, _>(&state.db, id).await?;
    Ok(Json(entry.into()))
}

#[utoipa::path(
    post,
    path = "/{id}/upload",
    tag = "Annotations",
    operation_id = "uploadAnnotation",
    summary = "Upload the content of an annotation",
    description = "Stores the `file` multipart field under a content-addressed key and verifies \
        it by reading it back. Uploading the same bytes again is a no-op.",
    params(("id" = i32, Path, description = "Annotation ID")),
    request_body(content_type = "multipart/form-data", description = "Annotation file"),
    responses(
        (status = 200, description = "Annotation with verified content", body = AnnotationOut),
        (status = 401, description = "Unauthorized (NOT_AUTHENTICATED, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (SCOPE_MISMATCH)", body = ErrorBody),
        (status = 404, description = "Annotation not found (NOT_FOUND)", body = ErrorBody),
        (status = 422, description = "Missing or oversized file (VALIDATION_ERROR)", body = ErrorBody),
        (status = 500, description = "UPLOAD_FAILED, INTEGRITY_CHECK_FAILED, DATA_CORRUPTED", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, requester, file), fields(id, access_id = requester.id(), file_name = %file.file_name))]
pub async fn upload_annotation(
    requester: Requester,
    State(state): State<AppState>,
    RecordId(id): RecordId,
    FileUpload(file): FileUpload,
) -> Result<Json<AnnotationOut>, AppError> {
    let entry = upload_object::<annotation::Entity, _>(
        &state.db,
        state.bucket.as_ref(),
        state.config.bucket.annotations_folder.as_deref(),
        id,
        &file,
    )
    .await?;

    Ok(Json(entry.into()))
}

#[utoipa::path(
    get,
    path = "/{id}/url",
    tag = "Annotations",
    operation_id = "getAnnotationUrl",
    summary = "Get a temporary URL to the annotation content",
    description = "Only admin accesses may read annotation content.",
    params(("id" = i32, Path, description = "Annotation ID")),
    responses(
        (status = 200, description = "Presigned URL", body = ObjectUrl),
        (status = 401, description = "Unauthorized (NOT_AUTHENTICATED, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (SCOPE_MISMATCH, READ_FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Annotation or content not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, requester), fields(id, access_id = requester.id()))]
pub async fn get_annotation_url(
    requester: Requester,
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Json<ObjectUrl>, AppError> {
    require_read_access(&state.db, requester.id()).await?;

    let entry = get_entry::<annotation::Entity, _>(&state.db, id).await?;
    let url = object_url(
        state.bucket.as_ref(),
        entry.bucket_key.as_deref(),
        Duration::from_secs(state.config.bucket.url_expiration_secs),
    )
    .await?;

    Ok(Json(ObjectUrl { url }))
}
