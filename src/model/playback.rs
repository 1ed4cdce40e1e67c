use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct PlayQueryDto {
    /// Discord server ID.
    pub serverid: Option<String>,
    /// Voice channel ID.
    pub vcid: Option<String>,
    /// Existing session to enqueue onto instead of creating a new one.
    pub session: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct PlaybackStartedDto {
    pub session_id: String,
    pub track: String,
    /// Always `"playing"`.
    pub status: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct PlaybackQueuedDto {
    pub session_id: String,
    pub track: String,
    /// 1-based position in the queue.
    pub position: usize,
    /// Track currently playing on the session, if it has not finished in
    /// the meantime.
    pub now_playing: Option<String>,
    /// Always `"queued"`.
    pub status: String,
}
