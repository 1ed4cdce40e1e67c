use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use capability::{ChannelKind, TrackSource};
use url::Url;

use crate::{
    model::{
        api::ErrorDto,
        playback::{PlayQueryDto, PlaybackQueuedDto, PlaybackStartedDto},
    },
    server::{
        error::AppError, middleware::auth::BotToken, state::AppState,
        util::parse::parse_discord_id,
    },
};

/// Tag for grouping music endpoints in OpenAPI documentation
pub static MUSIC_TAG: &str = "Music";

/// GET /play-mp3 - Play an MP3 file through a Discord voice channel
///
/// With `serverid` and `vcid` query parameters, joins the voice channel and
/// starts playing the MP3 given in the `mp3-url` header, creating a new
/// playback session for the guild. With a `session` query parameter, appends
/// the track to that session's queue instead; it starts once the tracks
/// ahead of it finish.
///
/// A guild has at most one session at a time, and a session is torn down
/// when its queue drains, when a track fails, or after one hour at most.
///
/// # Authentication
/// Requires a bot token in the `Authorization` header.
///
/// # Returns
/// - `200 OK`: Session id with `playing` or `queued` status
/// - `400 Bad Request`: Missing/invalid parameters, non-voice channel, or a
///   session already active for the guild
/// - `401 Unauthorized`: Missing bot token
/// - `404 Not Found`: Guild, channel or session not found
/// - `500 Internal Server Error`: Connection or transcoding failure
#[utoipa::path(
    get,
    path = "/play-mp3",
    tag = MUSIC_TAG,
    params(
        ("serverid" = Option<String>, Query, description = "The ID of the Discord server"),
        ("vcid" = Option<String>, Query, description = "The ID of the voice channel"),
        ("session" = Option<String>, Query, description = "Existing session to enqueue onto"),
        ("mp3-url" = String, Header, description = "The direct URL of the MP3 file")
    ),
    responses(
        (status = 200, description = "Playback started or track queued", body = PlaybackStartedDto),
        (status = 400, description = "Missing or invalid parameters", body = ErrorDto),
        (status = 401, description = "Unauthorized", body = ErrorDto),
        (status = 404, description = "Guild, channel or session not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn play_mp3(
    State(state): State<AppState>,
    BotToken(token): BotToken,
    Query(query): Query<PlayQueryDto>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let Some(mp3_url) = headers
        .get("mp3-url")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
    else {
        return Err(AppError::BadRequest(
            "Missing required parameter: mp3-url".to_string(),
        ));
    };
    let parsed = Url::parse(mp3_url)
        .map_err(|_| AppError::BadRequest("Invalid value for parameter: mp3-url".to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::BadRequest(
            "Invalid value for parameter: mp3-url".to_string(),
        ));
    }
    let track = TrackSource::new(mp3_url);

    // Enqueue variant: address an existing session instead of creating one.
    if let Some(session_id) = query
        .session
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        let position = state.sequencer.enqueue(session_id, track).await?;
        let snapshot = state.sequencer.registry().snapshot(session_id).await;
        if let Some(session) = &snapshot {
            tracing::info!(
                "Queued track at position {} for session {} (guild {}, channel {}, queue length {})",
                position,
                session.id,
                session.guild_id,
                session.channel_id,
                session.queue.len()
            );
        }
        let now_playing = snapshot.and_then(|session| session.now_playing.map(|t| t.url));
        return Ok((
            StatusCode::OK,
            Json(PlaybackQueuedDto {
                session_id: session_id.to_string(),
                track: mp3_url.to_string(),
                position,
                now_playing,
                status: "queued".to_string(),
            }),
        )
            .into_response());
    }

    let Some(serverid) = query.serverid.as_deref() else {
        return Err(AppError::BadRequest(
            "Missing required parameter: serverid".to_string(),
        ));
    };
    let Some(vcid) = query.vcid.as_deref() else {
        return Err(AppError::BadRequest(
            "Missing required parameter: vcid".to_string(),
        ));
    };
    let guild_id = parse_discord_id("serverid", serverid)?;
    let channel_id = parse_discord_id("vcid", vcid)?;

    // Resolve both objects before the voice connect, so an unknown guild or
    // channel fails with a 404 rather than a join error.
    let guild = state.discord.fetch_guild(&token, guild_id).await?;
    let channel = state.discord.fetch_channel(&token, channel_id).await?;
    if channel.kind != ChannelKind::Voice {
        return Err(AppError::BadRequest("Not a voice channel".to_string()));
    }

    let session_id = state
        .sequencer
        .begin(&token, guild.id, channel.id, track)
        .await?;

    Ok((
        StatusCode::OK,
        Json(PlaybackStartedDto {
            session_id,
            track: mp3_url.to_string(),
            status: "playing".to_string(),
        }),
    )
        .into_response())
}
