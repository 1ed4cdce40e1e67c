use axum::{extract::Path, http::StatusCode, response::IntoResponse, Json};
use chrono::SecondsFormat;

use crate::{
    model::{api::ErrorDto, snowflake::SnowflakeDto},
    server::{error::AppError, service::snowflake, util::parse::parse_discord_id},
};

/// Tag for grouping Discord utility endpoints in OpenAPI documentation
pub static DISCORD_TAG: &str = "Discord";

/// GET /snowflake/{snowflake} - Decode a Discord snowflake
///
/// Breaks a snowflake id into its creation timestamp, worker id, process id
/// and increment.
///
/// # Returns
/// - `200 OK`: Decoded fields
/// - `400 Bad Request`: Value is not a valid snowflake
#[utoipa::path(
    get,
    path = "/snowflake/{snowflake}",
    tag = DISCORD_TAG,
    params(
        ("snowflake" = String, Path, description = "The snowflake ID to decode")
    ),
    responses(
        (status = 200, description = "Successful request", body = SnowflakeDto),
        (status = 400, description = "Missing or invalid parameters", body = ErrorDto)
    ),
)]
pub async fn decode_snowflake(
    Path(snowflake): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_discord_id("snowflake", &snowflake)?;
    let decoded = snowflake::decode(id);

    Ok((
        StatusCode::OK,
        Json(SnowflakeDto {
            snowflake: id.to_string(),
            timestamp_ms: decoded.timestamp_ms,
            created_at: decoded
                .created_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            worker_id: decoded.worker_id,
            process_id: decoded.process_id,
            increment: decoded.increment,
        }),
    ))
}
