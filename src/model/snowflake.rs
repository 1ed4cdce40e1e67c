use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct SnowflakeDto {
    pub snowflake: String,
    /// Milliseconds since the Unix epoch encoded in the snowflake.
    pub timestamp_ms: i64,
    /// RFC 3339 rendering of the creation instant.
    pub created_at: String,
    pub worker_id: u8,
    pub process_id: u8,
    pub increment: u16,
}
