use axum::{Json, extract::State};
use sea_orm::ColumnTrait;
use tracing::instrument;

use crate::entity::access;
use crate::error::{AppError, ErrorBody};
use crate::extractors::form::AppForm;
use crate::models::auth::{LoginForm, TokenResponse, validate_login_form};
use crate::state::AppState;
use crate::utils::crud::fetch_one;
use crate::utils::hash;

#[utoipa::path(
    post,
    path = "/access-token",
    tag = "Login",
    operation_id = "createAccessToken",
    summary = "Exchange credentials for a bearer token",
    description = "OAuth2 password flow. The token carries the stored scope of the access and \
        expires after `auth.access_token_expire_minutes`.",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Unknown login or wrong password (INVALID_CREDENTIALS)", body = ErrorBody),
        (status = 422, description = "Malformed form (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, form), fields(login = %form.username))]
pub async fn create_access_token(
    State(state): State<AppState>,
    AppForm(form): AppForm<LoginForm>,
) -> Result<Json<TokenResponse>, AppError> {
    validate_login_form(&form)?;

    let entry = fetch_one::<access::Entity, _, _>(
        &state.db,
        access::Column::Login.eq(form.username.as_str()),
    )
    .await?
    .ok_or(AppError::InvalidCredentials)?;

    let is_valid = hash::verify_password(&form.password, &entry.hashed_password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {e}")))?;
    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    let token = state.tokens.issue_access_token(entry.id, &[entry.scope])?;
    Ok(Json(TokenResponse::bearer(token)))
}
