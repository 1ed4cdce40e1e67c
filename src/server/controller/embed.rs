use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    model::{
        api::ErrorDto,
        embed::{EmbedBuilderRequestDto, EmbedSentDto},
    },
    server::{
        error::AppError, middleware::auth::BotToken, service::embed::EmbedService,
        state::AppState, util::parse::parse_discord_id,
    },
};

use super::snowflake::DISCORD_TAG;

/// POST /embed-builder/{channel_id} - Post an embed through the bot
///
/// Builds an embed from the request body and sends it to the channel. The
/// embed must contain a title, description or at least one field.
///
/// # Authentication
/// Requires a bot token in the `Authorization` header.
///
/// # Returns
/// - `200 OK`: Id of the created message
/// - `400 Bad Request`: Empty embed, invalid color or invalid channel id
/// - `401 Unauthorized`: Missing bot token
/// - `404 Not Found`: Channel not found
/// - `500 Internal Server Error`: Platform rejection
#[utoipa::path(
    post,
    path = "/embed-builder/{channel_id}",
    tag = DISCORD_TAG,
    params(
        ("channel_id" = String, Path, description = "The ID of the Discord channel")
    ),
    request_body = EmbedBuilderRequestDto,
    responses(
        (status = 200, description = "Successful request", body = EmbedSentDto),
        (status = 400, description = "Missing or invalid parameters", body = ErrorDto),
        (status = 401, description = "Unauthorized", body = ErrorDto),
        (status = 404, description = "Channel not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn build_embed(
    State(state): State<AppState>,
    BotToken(token): BotToken,
    Path(channel_id): Path<String>,
    payload: Result<Json<EmbedBuilderRequestDto>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let channel_id = parse_discord_id("channel_id", &channel_id)?;
    let request = payload.map(|Json(body)| body).unwrap_or_default();

    let message_id = EmbedService::new(state.discord.as_ref())
        .send(&token, channel_id, request)
        .await?;

    Ok((
        StatusCode::OK,
        Json(EmbedSentDto {
            message_id: message_id.to_string(),
            channel_id: channel_id.to_string(),
        }),
    ))
}
