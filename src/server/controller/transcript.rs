use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    model::{api::ErrorDto, transcript::TranscriptDto},
    server::{
        error::AppError, middleware::auth::BotToken, service::transcript::TranscriptService,
        state::AppState, util::parse::parse_discord_id,
    },
};

use super::snowflake::DISCORD_TAG;

/// GET /transcript/{channel_id} - Export a channel transcript (max 200 messages)
///
/// Renders the most recent messages of a text channel into an HTML file
/// served under `/transcripts/` and returns its URL. Transcripts are deleted
/// automatically after seven days.
///
/// # Authentication
/// Requires a bot token in the `Authorization` header.
///
/// # Returns
/// - `200 OK`: Transcript URL
/// - `400 Bad Request`: Invalid channel id or not a text channel
/// - `401 Unauthorized`: Missing bot token
/// - `404 Not Found`: Channel not found
/// - `500 Internal Server Error`: Platform rejection or write failure
#[utoipa::path(
    get,
    path = "/transcript/{channel_id}",
    tag = DISCORD_TAG,
    params(
        ("channel_id" = String, Path, description = "The ID of the Discord channel")
    ),
    responses(
        (status = 200, description = "Successful request", body = TranscriptDto),
        (status = 400, description = "Missing or invalid parameters", body = ErrorDto),
        (status = 401, description = "Unauthorized", body = ErrorDto),
        (status = 404, description = "Channel not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn export_transcript(
    State(state): State<AppState>,
    BotToken(token): BotToken,
    Path(channel_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let channel_id = parse_discord_id("channelId", &channel_id)?;

    let url = TranscriptService::new(state.discord.as_ref(), &state.artifacts)
        .export(&token, channel_id)
        .await?;

    Ok((StatusCode::OK, Json(TranscriptDto { url })))
}
