use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::media::{self, MediaType};

/// Request body for creating or replacing a media record.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct MediaIn {
    /// Defaults to `image`.
    #[serde(rename = "type", default)]
    pub kind: MediaType,
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct MediaOut {
    #[schema(example = 1)]
    pub id: i32,
    #[serde(rename = "type")]
    pub kind: MediaType,
    pub created_at: DateTime<Utc>,
}

impl From<media::Model> for MediaOut {
    fn from(model: media::Model) -> Self {
        Self {
            id: model.id,
            kind: model.kind,
            created_at: model.created_at,
        }
    }
}
