use std::sync::Arc;

use anyhow::Context;
use common::storage::Bucket;
use common::storage::filesystem::FilesystemBucket;
use common::storage::s3::{S3Bucket, S3Settings};
use tracing::info;
use tracing_subscriber::EnvFilter;

use server::config::{AppConfig, BucketBackend, BucketConfig};
use server::state::AppState;
use server::utils::jwt::TokenService;

async fn build_bucket(config: &BucketConfig) -> anyhow::Result<Arc<dyn Bucket>> {
    let bucket: Arc<dyn Bucket> = match config.backend {
        BucketBackend::S3 => Arc::new(S3Bucket::new(S3Settings {
            name: config.name.clone(),
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
            access_key: config.access_key.clone(),
            secret_key: config.secret_key.clone(),
            path_style: config.path_style,
        })),
        BucketBackend::Filesystem => Arc::new(
            FilesystemBucket::new(config.local_path.clone().into())
                .await
                .context("Failed to open filesystem bucket")?,
        ),
    };
    Ok(bucket)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = server::database::init_db(&config.database.url)
        .await
        .context("Failed to initialize database")?;
    server::seed::seed_superuser(&db, &config.superuser).await?;

    let bucket = build_bucket(&config.bucket).await?;
    info!(backend = ?config.bucket.backend, bucket = %config.bucket.name, "Bucket configured");

    let state = AppState {
        db,
        tokens: Arc::new(TokenService::from_config(&config.auth)),
        bucket,
        config: config.clone(),
    };

    let app = server::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
