use std::sync::Arc;
use std::time::Duration;

use capability::{CardRenderer, DiscordApi, VoiceConnector};

use crate::server::{
    capability::{ImageCardRenderer, SerenityDiscord, SongbirdConnector},
    config::Config,
    error::AppError,
    router,
    scheduler::artifact_cleanup,
    service::{
        artifact::ArtifactStore,
        playback::{PlaybackSequencer, SessionRegistry},
    },
    state::AppState,
};

/// Builds the shared HTTP client for caller-supplied media URLs.
///
/// Redirects are bounded and only the connection phase carries a timeout;
/// a total-request timeout would cut off long-running audio streams.
pub fn setup_reqwest_client() -> Result<reqwest::Client, AppError> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::limited(5))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(|err| AppError::InternalError(format!("Failed to build HTTP client: {}", err)))
}

/// Wires up configuration, capabilities and state, then serves the API.
///
/// Runs until the listener fails; the retention scheduler runs as a
/// background task with its own error logging.
pub async fn run() -> Result<(), AppError> {
    let config = Config::from_env()?;

    let http_client = setup_reqwest_client()?;

    let artifacts = ArtifactStore::new(&config.artifact_dir, config.app_url.as_str());
    artifacts.ensure_layout().await?;

    let discord: Arc<dyn DiscordApi> = Arc::new(SerenityDiscord::new());
    let renderer: Arc<dyn CardRenderer> = Arc::new(ImageCardRenderer::new(
        http_client.clone(),
        &config.card_font_path,
    ));
    let connector: Arc<dyn VoiceConnector> = Arc::new(SongbirdConnector::new(http_client));
    let sequencer = PlaybackSequencer::new(SessionRegistry::new(), connector);

    // Start transcript retention sweep
    let sweep_store = artifacts.clone();
    tokio::spawn(async move {
        if let Err(err) = artifact_cleanup::start_scheduler(sweep_store).await {
            tracing::error!("Artifact cleanup scheduler error: {}", err);
        }
    });

    let state = AppState::new(discord, renderer, artifacts, sequencer);
    let app = router::router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!("Server is running on port {}", config.port);
    axum::serve(listener, app).await?;

    Ok(())
}
