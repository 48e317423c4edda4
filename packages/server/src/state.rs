use std::sync::Arc;

use common::storage::Bucket;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::utils::jwt::TokenService;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    /// Signing key is fixed for the lifetime of the process.
    pub tokens: Arc<TokenService>,
    pub bucket: Arc<dyn Bucket>,
}
