use serde::{Deserialize, Serialize};

use crate::entity::access::{self, Scope};
use crate::error::AppError;

/// Request body for creating an access.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct AccessAuth {
    /// Unique login (3-50 characters).
    #[schema(example = "JohnDoe")]
    pub login: String,
    /// Password (at least 3 characters).
    #[schema(example = "PickARobustOne")]
    pub password: String,
    /// Defaults to `user`.
    #[serde(default = "default_scope")]
    pub scope: Scope,
}

fn default_scope() -> Scope {
    Scope::User
}

/// Request body for replacing the password of an access.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct Cred {
    #[schema(example = "PickARobustOne")]
    pub password: String,
}

pub fn validate_login(login: &str) -> Result<(), AppError> {
    let len = login.chars().count();
    if !(3..=50).contains(&len) {
        return Err(AppError::Validation("Login must be 3-50 characters".into()));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < 3 {
        return Err(AppError::Validation(
            "Password must be at least 3 characters".into(),
        ));
    }
    Ok(())
}

pub fn validate_access_auth(payload: &AccessAuth) -> Result<(), AppError> {
    validate_login(&payload.login)?;
    validate_password(&payload.password)
}

/// Public view of an access. The password hash never leaves the server.
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct AccessRead {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "JohnDoe")]
    pub login: String,
    pub scope: Scope,
}

impl From<access::Model> for AccessRead {
    fn from(model: access::Model) -> Self {
        Self {
            id: model.id,
            login: model.login,
            scope: model.scope,
        }
    }
}
