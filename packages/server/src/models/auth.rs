use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// OAuth2 password-flow form for obtaining a token.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginForm {
    /// Login of the access.
    #[schema(example = "JohnDoe")]
    pub username: String,
    #[schema(example = "PickARobustOne")]
    pub password: String,
}

pub fn validate_login_form(form: &LoginForm) -> Result<(), AppError> {
    if form.username.is_empty() {
        return Err(AppError::Validation("Username must not be empty".into()));
    }
    if form.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

/// Issued bearer token.
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct TokenResponse {
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Always `bearer`.
    #[schema(example = "bearer")]
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}
