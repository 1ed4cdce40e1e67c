//! Voice playback sessions: registry and sequencer.
//!
//! A session owns one live voice-channel connection, the player attached to
//! it, and a FIFO backlog of not-yet-started tracks. The registry is the
//! single source of truth for which sessions exist; the sequencer is the only
//! component that advances a session's queue, driven by the asynchronous
//! completion events of the voice capability.

pub mod registry;
pub mod sequencer;

pub use registry::{PlaybackSession, SessionRegistry, SessionSnapshot};
pub use sequencer::PlaybackSequencer;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::model::api::ErrorDto;

#[derive(Error, Debug)]
pub enum SessionError {
    /// No session with the given identifier exists.
    ///
    /// Results in a 404 Not Found response. Enqueueing against an unknown
    /// identifier never creates a session as a side effect.
    #[error("Session {0} not found")]
    NotFound(String),

    /// The guild already has an active playback session.
    ///
    /// Results in a 400 Bad Request response; callers wanting to add tracks
    /// to the existing session must address it by its session identifier.
    #[error("A playback session already exists for guild {0}")]
    GuildBusy(u64),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::GuildBusy(_) => StatusCode::BAD_REQUEST,
        };
        (
            status,
            Json(ErrorDto {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
