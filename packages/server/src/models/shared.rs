use serde::{Deserialize, Serialize};

/// Temporary URL to the stored content of a record.
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct ObjectUrl {
    #[schema(example = "https://bucket.example.org/media/ba7816bf8f01cfea414140de5dae2223.jpg?X-Amz-Expires=3600")]
    pub url: String,
}

/// Liveness probe response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: &'static str,
}
