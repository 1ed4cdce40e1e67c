//! Discord platform capability.
//!
//! The server authenticates with the caller-supplied bot token on every call,
//! so each operation takes the token explicitly; implementations construct
//! whatever client they need per call and release it afterwards.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::UpstreamError;

/// Minimal view of a guild.
#[derive(Debug, Clone)]
pub struct GuildSummary {
    pub id: u64,
    pub name: String,
}

/// Channel classification as far as this service cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Text,
    Voice,
    Other,
}

/// Minimal view of a channel.
#[derive(Debug, Clone)]
pub struct ChannelInfo {
    pub id: u64,
    pub name: String,
    pub kind: ChannelKind,
}

/// One guild member with a presence flag.
///
/// `online` is true only for the `online` status; idle, do-not-disturb and
/// offline members all report false.
#[derive(Debug, Clone)]
pub struct MemberPresence {
    pub user_id: u64,
    pub username: String,
    pub online: bool,
}

/// An attachment on a fetched message.
#[derive(Debug, Clone)]
pub struct AttachmentRecord {
    pub filename: String,
    pub url: String,
}

/// One message of a channel history fetch, newest-last.
#[derive(Debug, Clone)]
pub struct MessageRecord {
    pub id: u64,
    pub author_id: u64,
    pub author_name: String,
    pub author_avatar_url: Option<String>,
    pub author_bot: bool,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub attachments: Vec<AttachmentRecord>,
}

/// Minimal view of a user.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
    pub avatar_url: Option<String>,
    pub bot: bool,
}

/// One field of an outgoing embed.
#[derive(Debug, Clone)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// An embed to post through the bot.
#[derive(Debug, Clone, Default)]
pub struct EmbedSpec {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: Option<u32>,
    pub url: Option<String>,
    pub fields: Vec<EmbedField>,
    pub footer_text: Option<String>,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub author_name: Option<String>,
    pub author_icon_url: Option<String>,
}

/// REST-level operations against the Discord platform.
///
/// Absent objects come back as [`UpstreamError::NotFound`]; any other
/// rejection (bad token, missing permission, rate limit) is
/// [`UpstreamError::Api`].
#[async_trait]
pub trait DiscordApi: Send + Sync {
    async fn fetch_guild(&self, token: &str, guild_id: u64) -> Result<GuildSummary, UpstreamError>;

    async fn fetch_channel(
        &self,
        token: &str,
        channel_id: u64,
    ) -> Result<ChannelInfo, UpstreamError>;

    /// Fetches all members of a guild together with their presence flag.
    async fn fetch_members(
        &self,
        token: &str,
        guild_id: u64,
    ) -> Result<Vec<MemberPresence>, UpstreamError>;

    /// Fetches up to `limit` most recent messages of a channel,
    /// oldest-first in the returned vector.
    async fn fetch_messages(
        &self,
        token: &str,
        channel_id: u64,
        limit: usize,
    ) -> Result<Vec<MessageRecord>, UpstreamError>;

    async fn fetch_user(&self, token: &str, user_id: u64) -> Result<UserProfile, UpstreamError>;

    /// Posts an embed to a channel and returns the created message id.
    async fn send_embed(
        &self,
        token: &str,
        channel_id: u64,
        embed: &EmbedSpec,
    ) -> Result<u64, UpstreamError>;
}
