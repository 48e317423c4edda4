use axum::extract::DefaultBodyLimit;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    let upload_limit = DefaultBodyLimit::max(config.bucket.max_upload_size);

    OpenApiRouter::new()
        .routes(routes!(handlers::health::health))
        .nest("/login", login_routes())
        .nest("/accesses", access_routes())
        .nest("/media", media_routes(upload_limit.clone()))
        .nest("/annotations", annotation_routes(upload_limit))
}

fn login_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::login::create_access_token))
}

fn access_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::access::create_access,
            handlers::access::list_accesses
        ))
        .routes(routes!(
            handlers::access::get_access,
            handlers::access::update_access_password,
            handlers::access::delete_access
        ))
        .routes(routes!(handlers::access::issue_unlimited_token))
}

fn media_routes(upload_limit: DefaultBodyLimit) -> OpenApiRouter<AppState> {
    let upload = OpenApiRouter::new()
        .routes(routes!(handlers::media::upload_media))
        .layer(upload_limit);

    OpenApiRouter::new()
        .routes(routes!(
            handlers::media::create_media,
            handlers::media::list_media
        ))
        .routes(routes!(
            handlers::media::get_media,
            handlers::media::update_media,
            handlers::media::delete_media
        ))
        .routes(routes!(handlers::media::get_media_url))
        .merge(upload)
}

fn annotation_routes(upload_limit: DefaultBodyLimit) -> OpenApiRouter<AppState> {
    let upload = OpenApiRouter::new()
        .routes(routes!(handlers::annotation::upload_annotation))
        .layer(upload_limit);

    OpenApiRouter::new()
        .routes(routes!(
            handlers::annotation::create_annotation,
            handlers::annotation::list_annotations
        ))
        .routes(routes!(
            handlers::annotation::get_annotation,
            handlers::annotation::update_annotation,
            handlers::annotation::delete_annotation
        ))
        .routes(routes!(handlers::annotation::get_annotation_url))
        .merge(upload)
}
