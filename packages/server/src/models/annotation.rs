use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::annotation;

/// Request body for creating or replacing an annotation record.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct AnnotationIn {
    /// Id of the annotated media. Must exist.
    #[schema(example = 1)]
    pub media_id: i32,
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct AnnotationOut {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = 1)]
    pub media_id: i32,
    pub created_at: DateTime<Utc>,
}

impl From<annotation::Model> for AnnotationOut {
    fn from(model: annotation::Model) -> Self {
        Self {
            id: model.id,
            media_id: model.media_id,
            created_at: model.created_at,
        }
    }
}
