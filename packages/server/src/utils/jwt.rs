use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::AuthConfig;
use crate::entity::access::Scope;

/// JWT Claims structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,        // Access ID
    pub scopes: Vec<Scope>, // Granted scopes
    pub iat: i64,           // Issued-at timestamp
    pub exp: i64,           // Expiration timestamp
}

/// Identity and scopes carried by a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub access_id: i32,
    pub scopes: Vec<Scope>,
}

#[derive(Debug, Error)]
pub enum TokenError {
    /// Bad signature, malformed structure, or expired.
    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    /// Signature is valid but required claims are missing or mistyped.
    #[error("invalid token payload: {0}")]
    Payload(String),

    #[error("token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Issues and verifies HS256 bearer tokens with a process-wide key.
///
/// Tokens are only valid for the lifetime of the signing key: a restart with a
/// freshly generated key invalidates every token issued before it.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    unlimited_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], access_ttl: Duration, unlimited_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::default(),
            access_ttl,
            unlimited_ttl,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            config.signing_secret().as_bytes(),
            Duration::minutes(config.access_token_expire_minutes),
            Duration::minutes(config.unlimited_token_expire_minutes),
        )
    }

    /// Sign a token with the standard (login) lifetime.
    pub fn issue_access_token(&self, access_id: i32, scopes: &[Scope]) -> Result<String, TokenError> {
        self.issue(access_id, scopes, self.access_ttl)
    }

    /// Sign a long-lived token for a machine identity.
    pub fn issue_unlimited_token(
        &self,
        access_id: i32,
        scopes: &[Scope],
    ) -> Result<String, TokenError> {
        self.issue(access_id, scopes, self.unlimited_ttl)
    }

    pub fn issue(&self, access_id: i32, scopes: &[Scope], ttl: Duration) -> Result<String, TokenError> {
        self.issue_at(access_id, scopes, ttl, Utc::now())
    }

    /// Sign a token as if issued at `now`. Output is deterministic for a given key and clock.
    pub fn issue_at(
        &self,
        access_id: i32,
        scopes: &[Scope],
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: access_id.to_string(),
            scopes: scopes.to_vec(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(TokenError::Signing)
    }

    /// Verify the signature and expiry, then extract identity and scopes.
    pub fn verify(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        let payload = decode::<Map<String, Value>>(token, &self.decoding, &self.validation)
            .map_err(|e| {
                let payload_error = match e.kind() {
                    ErrorKind::MissingRequiredClaim(claim) => Some(format!("missing claim `{claim}`")),
                    ErrorKind::Json(err) => Some(err.to_string()),
                    _ => None,
                };
                match payload_error {
                    Some(msg) => TokenError::Payload(msg),
                    None => TokenError::Invalid(e),
                }
            })?
            .claims;

        let access_id = match payload.get("sub") {
            Some(Value::String(s)) => s.parse::<i32>().ok(),
            Some(Value::Number(n)) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
            Some(_) => None,
            None => return Err(TokenError::Payload("missing claim `sub`".into())),
        }
        .filter(|id| *id > 0)
        .ok_or_else(|| TokenError::Payload("claim `sub` is not a valid access id".into()))?;

        let scopes = match payload.get("scopes") {
            Some(value) => serde_json::from_value::<Vec<Scope>>(value.clone())
                .map_err(|e| TokenError::Payload(format!("claim `scopes`: {e}")))?,
            None => Vec::new(),
        };

        Ok(VerifiedToken { access_id, scopes })
    }
}
