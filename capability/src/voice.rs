//! Voice playback capability.
//!
//! A connector establishes one live voice-channel connection and hands back
//! an exclusive [`VoiceHandle`] plus the completion channel for that
//! connection. Track lifecycle events arrive on the channel asynchronously;
//! the playback sequencer owns the receiving end and is the only consumer.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::MediaError;

/// Reference to one playable track. Currently a direct media URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSource {
    pub url: String,
}

impl TrackSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Asynchronous track lifecycle signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// The current track played to the end.
    Finished,
    /// The current track failed mid-stream (decode or transport error).
    Failed,
}

/// Receiving end of a session's completion channel.
pub type CompletionReceiver = mpsc::Receiver<PlaybackEvent>;

/// A live voice connection with its completion channel.
pub struct VoiceSession {
    pub handle: Box<dyn VoiceHandle>,
    pub completions: CompletionReceiver,
}

/// Establishes voice connections.
#[async_trait]
pub trait VoiceConnector: Send + Sync {
    /// Logs in with the given bot token and joins the voice channel.
    async fn connect(
        &self,
        token: &str,
        guild_id: u64,
        channel_id: u64,
    ) -> Result<VoiceSession, MediaError>;
}

/// Exclusive handle to one established voice connection.
#[async_trait]
pub trait VoiceHandle: Send + Sync {
    /// Starts transcoding and playing a track into the connection.
    ///
    /// Completion (or mid-stream failure) of the track is delivered later on
    /// the session's completion channel, not by this call.
    async fn play(&mut self, track: &TrackSource) -> Result<(), MediaError>;

    /// Releases the connection and any player attached to it. Best-effort:
    /// implementations log and swallow teardown failures.
    async fn disconnect(&mut self);
}
