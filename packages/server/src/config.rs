use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Signing key used when `auth.debug` is on and no explicit key is configured,
/// so issued tokens stay valid across restarts during development.
pub const DEBUG_SECRET_KEY: &str = "000000000000000000000000000000000000";

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Explicit signing secret. When absent, see [`AuthConfig::signing_secret`].
    #[serde(default)]
    pub secret_key: Option<String>,
    #[serde(default = "default_debug")]
    pub debug: bool,
    /// Lifetime of tokens issued at login.
    #[serde(default = "default_access_token_expire_minutes")]
    pub access_token_expire_minutes: i64,
    /// Lifetime of long-lived tokens issued to machine identities.
    #[serde(default = "default_unlimited_token_expire_minutes")]
    pub unlimited_token_expire_minutes: i64,
}

fn default_debug() -> bool {
    true
}
fn default_access_token_expire_minutes() -> i64 {
    60
}
fn default_unlimited_token_expire_minutes() -> i64 {
    60 * 24 * 365 * 10
}

impl AuthConfig {
    /// Resolve the process-wide signing secret.
    ///
    /// An explicit key wins; debug deployments fall back to [`DEBUG_SECRET_KEY`];
    /// otherwise a random key is generated, so tokens die with the process.
    pub fn signing_secret(&self) -> String {
        match (&self.secret_key, self.debug) {
            (Some(key), _) if !key.is_empty() => key.clone(),
            (_, true) => DEBUG_SECRET_KEY.to_string(),
            _ => hex::encode(rand::random::<[u8; 32]>()),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BucketBackend {
    S3,
    Filesystem,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BucketConfig {
    pub backend: BucketBackend,
    pub name: String,
    pub region: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
    pub path_style: bool,
    /// Root directory of the filesystem backend.
    pub local_path: String,
    /// Subfolder prefixed to media object keys.
    #[serde(default)]
    pub media_folder: Option<String>,
    /// Subfolder prefixed to annotation object keys.
    #[serde(default)]
    pub annotations_folder: Option<String>,
    pub url_expiration_secs: u64,
    pub max_upload_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SuperuserConfig {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub bucket: BucketConfig,
    pub superuser: SuperuserConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("PYROSTORE_CONFIG").unwrap_or_else(|_| "config/config".to_string());

        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("auth.debug", true)?
            .set_default("auth.access_token_expire_minutes", 60)?
            .set_default("auth.unlimited_token_expire_minutes", 60 * 24 * 365 * 10)?
            .set_default("bucket.backend", "s3")?
            .set_default("bucket.name", "pyrostore")?
            .set_default("bucket.region", "us-east-1")?
            .set_default("bucket.path_style", true)?
            .set_default("bucket.local_path", "./data/bucket")?
            .set_default("bucket.url_expiration_secs", 3600)?
            .set_default("bucket.max_upload_size", 64 * 1024 * 1024)?
            // Load from config/config.toml
            .add_source(File::with_name(&config_path).required(false))
            // Override from environment (e.g., PYROSTORE__SUPERUSER__LOGIN)
            .add_source(Environment::with_prefix("PYROSTORE").separator("__"))
            .build()?;

        let config: Self = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.superuser.login.trim().is_empty() || self.superuser.password.is_empty() {
            return Err(ConfigError::Message(
                "Missing credentials: set superuser.login and superuser.password".into(),
            ));
        }
        Ok(())
    }
}
