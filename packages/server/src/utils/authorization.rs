//! Access-control predicates.
//!
//! Two independent mechanisms are layered on the same identity:
//! - route gating ([`authenticate`]) decides which endpoints a token may call,
//!   from the scopes granted in the token;
//! - data visibility ([`require_read_access`], [`list_for`]) decides what an
//!   already authenticated caller may see, from the scope stored on the access.

use std::future::Future;

use sea_orm::{ConnectionTrait, EntityTrait};

use crate::entity::access::{self, Scope};
use crate::error::AppError;
use crate::utils::crud::get_entry;
use crate::utils::jwt::TokenService;

/// `true` if at least one granted scope is accepted by the route.
pub fn scopes_intersect(granted: &[Scope], required: &[Scope]) -> bool {
    granted.iter().any(|scope| required.contains(scope))
}

/// Resolve a bearer token to the access it was issued for.
///
/// Fails with 401 on a bad token, 422 on malformed claims or an unknown
/// access, and 403 if the token carries none of `required`.
pub async fn authenticate<C: ConnectionTrait>(
    db: &C,
    tokens: &TokenService,
    token: &str,
    required: &[Scope],
) -> Result<access::Model, AppError> {
    let verified = tokens.verify(token)?;

    let access = access::Entity::find_by_id(verified.access_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            AppError::Validation("Token payload refers to a nonexistent access.".into())
        })?;

    if !scopes_intersect(&verified.scopes, required) {
        tracing::debug!(
            access_id = access.id,
            granted = ?verified.scopes,
            required = ?required,
            "Scope mismatch"
        );
        return Err(AppError::ScopeMismatch);
    }

    Ok(access)
}

/// `true` iff the stored scope of the access is admin.
pub async fn is_admin<C: ConnectionTrait>(db: &C, access_id: i32) -> Result<bool, AppError> {
    let access = get_entry::<access::Entity, C>(db, access_id).await?;
    Ok(access.scope == Scope::Admin)
}

/// Only admins may read individual media and annotation records.
pub async fn require_read_access<C: ConnectionTrait>(
    db: &C,
    access_id: i32,
) -> Result<(), AppError> {
    if is_admin(db, access_id).await? {
        Ok(())
    } else {
        Err(AppError::ReadForbidden)
    }
}

/// Visibility filter for collection reads.
///
/// Admins get whatever `fetch` returns; anyone else silently gets an empty
/// list, and `fetch` is never run for them.
pub async fn list_for<C, T, F, Fut>(db: &C, access_id: i32, fetch: F) -> Result<Vec<T>, AppError>
where
    C: ConnectionTrait,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>, AppError>>,
{
    if is_admin(db, access_id).await? {
        fetch().await
    } else {
        Ok(Vec::new())
    }
}
