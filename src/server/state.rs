//! Application state shared across all request handlers.
//!
//! Initialized once during startup and cloned per request through Axum's
//! state extraction. All fields are cheap to clone: the capability handles
//! are `Arc`s, the artifact store and sequencer share their state internally.

use std::sync::Arc;

use capability::{CardRenderer, DiscordApi};

use crate::server::service::{artifact::ArtifactStore, playback::PlaybackSequencer};

#[derive(Clone)]
pub struct AppState {
    /// Discord platform capability; per-call bot-token authentication.
    pub discord: Arc<dyn DiscordApi>,

    /// Card compositing capability.
    pub renderer: Arc<dyn CardRenderer>,

    /// Filesystem store for generated transcripts and card images.
    pub artifacts: ArtifactStore,

    /// Voice playback sessions and their queue sequencing.
    pub sequencer: PlaybackSequencer,
}

impl AppState {
    pub fn new(
        discord: Arc<dyn DiscordApi>,
        renderer: Arc<dyn CardRenderer>,
        artifacts: ArtifactStore,
        sequencer: PlaybackSequencer,
    ) -> Self {
        Self {
            discord,
            renderer,
            artifacts,
            sequencer,
        }
    }
}
