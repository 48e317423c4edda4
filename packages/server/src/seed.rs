use anyhow::Context;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::info;

use crate::config::SuperuserConfig;
use crate::entity::access::{self, Scope};
use crate::utils::hash::hash_password;

/// Create the configured superuser unless an access with that login exists.
///
/// Returns `true` if a new access was inserted.
pub async fn seed_superuser(
    db: &DatabaseConnection,
    superuser: &SuperuserConfig,
) -> anyhow::Result<bool> {
    let existing = access::Entity::find()
        .filter(access::Column::Login.eq(superuser.login.as_str()))
        .one(db)
        .await
        .context("Failed to look up superuser")?;

    if existing.is_some() {
        return Ok(false);
    }

    let hashed_password = hash_password(&superuser.password)
        .map_err(|e| anyhow::anyhow!("Password hash error: {e}"))?;

    access::ActiveModel {
        login: Set(superuser.login.clone()),
        hashed_password: Set(hashed_password),
        scope: Set(Scope::Admin),
        ..Default::default()
    }
    .insert(db)
    .await
    .context("Failed to create superuser")?;

    info!(login = %superuser.login, "Seeded superuser access");
    Ok(true)
}
