use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    model::{api::ErrorDto, presence::ServerPresenceDto},
    server::{
        error::AppError, middleware::auth::BotToken, service::presence::PresenceService,
        state::AppState, util::parse::parse_discord_id,
    },
};

use super::snowflake::DISCORD_TAG;

/// GET /server-presence/{server_id} - Online/offline summary of a server
///
/// Buckets every member of the server into online and offline groups with
/// totals, as seen by the caller's bot.
///
/// # Authentication
/// Requires a bot token in the `Authorization` header.
///
/// # Returns
/// - `200 OK`: Presence buckets
/// - `400 Bad Request`: Invalid server id
/// - `401 Unauthorized`: Missing bot token
/// - `404 Not Found`: Guild not found
/// - `500 Internal Server Error`: Platform rejection
#[utoipa::path(
    get,
    path = "/server-presence/{server_id}",
    tag = DISCORD_TAG,
    params(
        ("server_id" = String, Path, description = "The ID of the Discord server")
    ),
    responses(
        (status = 200, description = "Successful request", body = ServerPresenceDto),
        (status = 400, description = "Missing or invalid parameters", body = ErrorDto),
        (status = 401, description = "Unauthorized", body = ErrorDto),
        (status = 404, description = "Guild not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn server_presence(
    State(state): State<AppState>,
    BotToken(token): BotToken,
    Path(server_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let guild_id = parse_discord_id("serverId", &server_id)?;

    let summary = PresenceService::new(state.discord.as_ref())
        .summarize(&token, guild_id)
        .await?;

    Ok((StatusCode::OK, Json(summary)))
}
