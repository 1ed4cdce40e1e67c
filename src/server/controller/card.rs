use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    model::{
        api::ErrorDto,
        card::{CardResponseDto, ProfileCardRequestDto, RankCardRequestDto},
    },
    server::{
        error::AppError, middleware::auth::BotToken, service::card::CardService, state::AppState,
        util::parse::parse_discord_id,
    },
};

/// Tag for grouping card endpoints in OpenAPI documentation
pub static CARDS_TAG: &str = "Cards";

/// POST /profile-card/{user_id} - Render a profile card
///
/// Composites a profile card PNG for the user and returns the image URL
/// under `/cards/`. Both border colors are required.
///
/// # Authentication
/// Requires a bot token in the `Authorization` header.
///
/// # Returns
/// - `200 OK`: Image URL
/// - `400 Bad Request`: Missing border colors or invalid user id
/// - `401 Unauthorized`: Missing bot token
/// - `404 Not Found`: User not found
/// - `500 Internal Server Error`: Rendering or write failure
#[utoipa::path(
    post,
    path = "/profile-card/{user_id}",
    tag = CARDS_TAG,
    params(
        ("user_id" = String, Path, description = "The ID of the Discord user")
    ),
    request_body = ProfileCardRequestDto,
    responses(
        (status = 200, description = "Successful request", body = CardResponseDto),
        (status = 400, description = "Missing or invalid parameters", body = ErrorDto),
        (status = 401, description = "Unauthorized", body = ErrorDto),
        (status = 404, description = "User not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn profile_card(
    State(state): State<AppState>,
    BotToken(token): BotToken,
    Path(user_id): Path<String>,
    payload: Result<Json<ProfileCardRequestDto>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = parse_discord_id("userid", &user_id)?;
    let request = payload.map(|Json(body)| body).unwrap_or_default();

    let image_url = CardService::new(
        state.discord.as_ref(),
        state.renderer.as_ref(),
        &state.artifacts,
    )
    .render_profile_card(&token, user_id, request)
    .await?;

    Ok((StatusCode::OK, Json(CardResponseDto { image_url })))
}

/// POST /rank-card/{user_id} - Render a rank card
///
/// Composites a rank card PNG with an XP bar and level/rank labels and
/// returns the image URL under `/cards/`. Requires both border colors plus
/// `barColor`, `levelColor`, `rank`, `currentXp`, `requiredXp` and `level`.
///
/// # Authentication
/// Requires a bot token in the `Authorization` header.
///
/// # Returns
/// - `200 OK`: Image URL
/// - `400 Bad Request`: Missing required parameters or invalid user id
/// - `401 Unauthorized`: Missing bot token
/// - `404 Not Found`: User not found
/// - `500 Internal Server Error`: Rendering or write failure
#[utoipa::path(
    post,
    path = "/rank-card/{user_id}",
    tag = CARDS_TAG,
    params(
        ("user_id" = String, Path, description = "The ID of the Discord user")
    ),
    request_body = RankCardRequestDto,
    responses(
        (status = 200, description = "Successful request", body = CardResponseDto),
        (status = 400, description = "Missing or invalid parameters", body = ErrorDto),
        (status = 401, description = "Unauthorized", body = ErrorDto),
        (status = 404, description = "User not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn rank_card(
    State(state): State<AppState>,
    BotToken(token): BotToken,
    Path(user_id): Path<String>,
    payload: Result<Json<RankCardRequestDto>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = parse_discord_id("userid", &user_id)?;
    let request = payload.map(|Json(body)| body).unwrap_or_default();

    let image_url = CardService::new(
        state.discord.as_ref(),
        state.renderer.as_ref(),
        &state.artifacts,
    )
    .render_rank_card(&token, user_id, request)
    .await?;

    Ok((StatusCode::OK, Json(CardResponseDto { image_url })))
}
