use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct TranscriptDto {
    /// Public retrieval URL of the generated transcript file.
    pub url: String,
}
