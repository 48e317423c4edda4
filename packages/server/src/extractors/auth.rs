use std::marker::PhantomData;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::entity::access::{self, Scope};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::authorization::authenticate;

/// The set of token scopes a route accepts.
pub trait ScopeRequirement: Send + Sync + 'static {
    const SCOPES: &'static [Scope];
}

/// Routes reserved to administrators.
pub struct AdminOnly;

impl ScopeRequirement for AdminOnly {
    const SCOPES: &'static [Scope] = &[Scope::Admin];
}

/// Routes open to every authenticated access.
pub struct AnyScope;

impl ScopeRequirement for AnyScope {
    const SCOPES: &'static [Scope] = &[Scope::Admin, Scope::User];
}

/// Access resolved from the `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to gate the route on the scopes of `R`.
/// What the caller may *see* is decided separately, in the handler body.
pub struct Requester<R: ScopeRequirement = AnyScope> {
    pub access: access::Model,
    _scopes: PhantomData<fn() -> R>,
}

impl<R: ScopeRequirement> Requester<R> {
    pub fn id(&self) -> i32 {
        self.access.id
    }
}

/// Pull the bearer token out of the request headers.
fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let value = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::NotAuthenticated)?;

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() => {
            Ok(token.trim())
        }
        _ => Err(AppError::NotAuthenticated),
    }
}

impl<R: ScopeRequirement> FromRequestParts<AppState> for Requester<R> {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let access = authenticate(&state.db, &state.tokens, token, R::SCOPES).await?;

        Ok(Requester {
            access,
            _scopes: PhantomData,
        })
    }
}
