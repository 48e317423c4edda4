use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use sea_orm::{ColumnTrait, Set};
use tracing::instrument;

use crate::entity::access;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AdminOnly, Requester};
use crate::extractors::json::AppJson;
use crate::extractors::path::RecordId;
use crate::models::access::{AccessAuth, AccessRead, Cred, validate_access_auth, validate_password};
use crate::models::auth::TokenResponse;
use crate::state::AppState;
use crate::utils::crud::{create_entry, delete_entry, fetch_all, fetch_one, get_entry, update_entry};
use crate::utils::hash;

fn login_taken(login: &str) -> AppError {
    AppError::Conflict(format!("An entry with login='{login}' already exists."))
}

fn hash_password(password: &str) -> Result<String, AppError> {
    hash::hash_password(password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {e}")))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Accesses",
    operation_id = "createAccess",
    summary = "Create an access",
    description = "Creates a new identity. The scope defaults to `user`. Logins are unique.",
    request_body = AccessAuth,
    responses(
        (status = 201, description = "Access created", body = AccessRead),
        (status = 401, description = "Unauthorized (NOT_AUTHENTICATED, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (SCOPE_MISMATCH)", body = ErrorBody),
        (status = 409, description = "Login already taken (CONFLICT)", body = ErrorBody),
        (status = 422, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _requester, payload), fields(login = %payload.login))]
pub async fn create_access(
    _requester: Requester<AdminOnly>,
    State(state): State<AppState>,
    AppJson(payload): AppJson<AccessAuth>,
) -> Result<impl IntoResponse, AppError> {
    validate_access_auth(&payload)?;

    let existing = fetch_one::<access::Entity, _, _>(
        &state.db,
        access::Column::Login.eq(payload.login.as_str()),
    )
    .await?;
    if existing.is_some() {
        return Err(login_taken(&payload.login));
    }

    let new_access = access::ActiveModel {
        login: Set(payload.login.clone()),
        hashed_password: Set(hash_password(&payload.password)?),
        scope: Set(payload.scope),
        ..Default::default()
    };

    // A concurrent create can still win the race past the check above.
    let entry = match create_entry(&state.db, new_access).await {
        Err(AppError::Conflict(_)) => return Err(login_taken(&payload.login)),
        other => other?,
    };

    Ok((StatusCode::CREATED, Json(AccessRead::from(entry))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Accesses",
    operation_id = "listAccesses",
    summary = "List all accesses",
    responses(
        (status = 200, description = "All accesses, in creation order", body = Vec<AccessRead>),
        (status = 401, description = "Unauthorized (NOT_AUTHENTICATED, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (SCOPE_MISMATCH)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _requester))]
pub async fn list_accesses(
    _requester: Requester<AdminOnly>,
    State(state): State<AppState>,
) -> Result<Json<Vec<AccessRead>>, AppError> {
    let entries = fetch_all::<access::Entity, _>(&state.db).await?;
    Ok(Json(entries.into_iter().map(AccessRead::from).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Accesses",
    operation_id = "getAccess",
    summary = "Get an access by ID",
    params(("id" = i32, Path, description = "Access ID")),
    responses(
        (status = 200, description = "Access details", body = AccessRead),
        (status = 401, description = "Unauthorized (NOT_AUTHENTICATED, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (SCOPE_MISMATCH)", body = ErrorBody),
        (status = 404, description = "Access not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _requester), fields(id))]
pub async fn get_access(
    _requester: Requester<AdminOnly>,
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Json<AccessRead>, AppError> {
    let entry = get_entry::<access::Entity, _>(&state.db, id).await?;
    Ok(Json(entry.into()))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Accesses",
    operation_id = "updateAccessPassword",
    summary = "Replace the password of an access",
    params(("id" = i32, Path, description = "Access ID")),
    request_body = Cred,
    responses(
        (status = 200, description = "Password replaced", body = AccessRead),
        (status = 401, description = "Unauthorized (NOT_AUTHENTICATED, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (SCOPE_MISMATCH)", body = ErrorBody),
        (status = 404, description = "Access not found (NOT_FOUND)", body = ErrorBody),
        (status = 422, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _requester, payload), fields(id))]
pub async fn update_access_password(
    _requester: Requester<AdminOnly>,
    State(state): State<AppState>,
    RecordId(id): RecordId,
    AppJson(payload): AppJson<Cred>,
) -> Result<Json<AccessRead>, AppError> {
    validate_password(&payload.password)?;

    let entry = get_entry::<access::Entity, _>(&state.db, id).await?;
    let mut active: access::ActiveModel = entry.into();
    active.hashed_password = Set(hash_password(&payload.password)?);

    let updated = update_entry(&state.db, active).await?;
    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Accesses",
    operation_id = "deleteAccess",
    summary = "Delete an access",
    params(("id" = i32, Path, description = "Access ID")),
    responses(
        (status = 200, description = "Deleted access", body = AccessRead),
        (status = 401, description = "Unauthorized (NOT_AUTHENTICATED, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (SCOPE_MISMATCH)", body = ErrorBody),
        (status = 404, description = "Access not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _requester), fields(id))]
pub async fn delete_access(
    _requester: Requester<AdminOnly>,
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Json<AccessRead>, AppError> {
    let entry = delete_entry::<access::Entity, _>(&state.db, id).await?;
    Ok(Json(entry.into()))
}

#[utoipa::path(
    post,
    path = "/{id}/token",
    tag = "Accesses",
    operation_id = "issueUnlimitedToken",
    summary = "Issue a long-lived token for an access",
    description = "Intended for machine identities such as cameras. The token carries the stored \
        scope of the access and expires after `auth.unlimited_token_expire_minutes`.",
    params(("id" = i32, Path, description = "Access ID")),
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Unauthorized (NOT_AUTHENTICATED, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (SCOPE_MISMATCH)", body = ErrorBody),
        (status = 404, description = "Access not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _requester), fields(id))]
pub async fn issue_unlimited_token(
    _requester: Requester<AdminOnly>,
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Json<TokenResponse>, AppError> {
    let entry = get_entry::<access::Entity, _>(&state.db, id).await?;
    let token = state.tokens.issue_unlimited_token(entry.id, &[entry.scope])?;
    Ok(Json(TokenResponse::bearer(token)))
}
