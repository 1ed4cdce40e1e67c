use thiserror::Error;

/// Failure reported by the Discord platform capability.
///
/// `NotFound` is the only variant callers are expected to branch on: it means
/// the referenced Discord object does not exist (or the bot cannot see it)
/// and maps to a 404 at the HTTP boundary. Everything else is an opaque
/// upstream rejection surfaced to the caller as a generic server error.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// The referenced Discord object is absent.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Object kind for the message ("guild", "channel", "user").
        kind: &'static str,
        /// Discord snowflake of the missing object.
        id: u64,
    },

    /// The platform rejected the call for any other reason.
    #[error("Discord API call failed: {0}")]
    Api(String),
}

/// Failure in the media pipeline: voice gateway, transcoding/playback, or
/// card compositing. All variants map to a 500 at the HTTP boundary with the
/// detail logged server-side only.
#[derive(Error, Debug)]
pub enum MediaError {
    /// Could not bring up the gateway connection backing a voice session.
    #[error("voice gateway unavailable: {0}")]
    Gateway(String),

    /// Joining the voice channel failed.
    #[error("failed to join voice channel: {0}")]
    Join(String),

    /// Starting or continuing playback of a track failed.
    #[error("audio playback failed: {0}")]
    Playback(String),

    /// Card compositing failed.
    #[error("card rendering failed: {0}")]
    Render(String),
}
