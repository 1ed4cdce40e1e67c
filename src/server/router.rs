use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    model,
    server::{
        controller::{card, embed, playback, presence, snowflake, text, transcript},
        error::AppError,
        service::artifact::ArtifactKind,
        state::AppState,
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        text::lowercase,
        text::check_for_num,
        snowflake::decode_snowflake,
        presence::server_presence,
        transcript::export_transcript,
        embed::build_embed,
        playback::play_mp3,
        card::profile_card,
        card::rank_card,
    ),
    components(schemas(
        model::api::ErrorDto,
        model::text::LowercaseRequestDto,
        model::text::LowercaseResponseDto,
        model::text::NumberCheckRequestDto,
        model::text::NumberCheckResponseDto,
        model::snowflake::SnowflakeDto,
        model::presence::ServerPresenceDto,
        model::presence::PresenceBucketDto,
        model::presence::PresenceUserDto,
        model::transcript::TranscriptDto,
        model::embed::EmbedBuilderRequestDto,
        model::embed::EmbedFieldDto,
        model::embed::EmbedSentDto,
        model::playback::PlaybackStartedDto,
        model::playback::PlaybackQueuedDto,
        model::card::ProfileCardRequestDto,
        model::card::RankCardRequestDto,
        model::card::CardResponseDto,
    )),
    tags(
        (name = "Text", description = "Text utilities"),
        (name = "Discord", description = "Discord lookups, transcripts and embeds"),
        (name = "Music", description = "Voice channel MP3 playback"),
        (name = "Cards", description = "Profile and rank card rendering"),
    )
)]
struct ApiDoc;

pub fn router(state: AppState) -> Router {
    let transcripts_dir = state.artifacts.dir_path(ArtifactKind::Transcript);
    let cards_dir = state.artifacts.dir_path(ArtifactKind::Card);

    let api = Router::new()
        .route("/lowercase", post(text::lowercase))
        .route("/check-for-num", post(text::check_for_num))
        .route("/snowflake/{snowflake}", get(snowflake::decode_snowflake))
        .route("/server-presence/{server_id}", get(presence::server_presence))
        .route("/transcript/{channel_id}", get(transcript::export_transcript))
        .route("/embed-builder/{channel_id}", post(embed::build_embed))
        .route("/play-mp3", get(playback::play_mp3))
        .route("/profile-card/{user_id}", post(card::profile_card))
        .route("/rank-card/{user_id}", post(card::rank_card))
        .with_state(state);

    Router::new()
        .merge(api)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Generated artifacts are public by URL.
        .nest_service("/transcripts", ServeDir::new(transcripts_dir))
        .nest_service("/cards", ServeDir::new(cards_dir))
        .fallback(not_found)
        .layer(CorsLayer::permissive())
}

async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}
