//! Capability contracts for the botbridge server.
//!
//! Every external collaborator the server talks to (the Discord platform,
//! the voice transcoding/playback pipeline, the card compositor) is
//! reached through one of the traits defined here. The server wires in the
//! production implementations at startup; tests substitute the mocks from the
//! `test-utils` crate. Nothing in this crate performs I/O itself.

pub mod discord;
pub mod error;
pub mod render;
pub mod voice;

pub use discord::{
    AttachmentRecord, ChannelInfo, ChannelKind, DiscordApi, EmbedField, EmbedSpec, GuildSummary,
    MemberPresence, MessageRecord, UserProfile,
};
pub use error::{MediaError, UpstreamError};
pub use render::{CardOptions, CardRenderer, CardSubject, RankData};
pub use voice::{CompletionReceiver, PlaybackEvent, TrackSource, VoiceConnector, VoiceHandle, VoiceSession};
