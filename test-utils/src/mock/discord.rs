//! Fixture-backed mock of the Discord platform capability.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use capability::{
    ChannelInfo, ChannelKind, DiscordApi, EmbedSpec, GuildSummary, MemberPresence, MessageRecord,
    UpstreamError, UserProfile,
};

/// Per-operation call counters, snapshotted via [`MockDiscordApi::counts`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub fetch_guild: usize,
    pub fetch_channel: usize,
    pub fetch_members: usize,
    pub fetch_messages: usize,
    pub fetch_user: usize,
    pub send_embed: usize,
}

impl CallCounts {
    /// Total calls across all operations.
    pub fn total(&self) -> usize {
        self.fetch_guild
            + self.fetch_channel
            + self.fetch_members
            + self.fetch_messages
            + self.fetch_user
            + self.send_embed
    }
}

#[derive(Default)]
struct Fixtures {
    guilds: HashMap<u64, GuildSummary>,
    channels: HashMap<u64, ChannelInfo>,
    members: HashMap<u64, Vec<MemberPresence>>,
    messages: HashMap<u64, Vec<MessageRecord>>,
    users: HashMap<u64, UserProfile>,
    fail_all: Option<String>,
    counts: CallCounts,
    sent_embeds: Vec<(u64, EmbedSpec)>,
}

/// Mock [`DiscordApi`] serving scripted fixtures.
///
/// Objects not registered through the `with_*` builders come back as
/// [`UpstreamError::NotFound`], matching the production mapping. Cheap to
/// clone; clones share fixtures and counters.
#[derive(Clone, Default)]
pub struct MockDiscordApi {
    state: Arc<Mutex<Fixtures>>,
}

impl MockDiscordApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_guild(self, id: u64, name: &str) -> Self {
        self.state.lock().unwrap().guilds.insert(
            id,
            GuildSummary {
                id,
                name: name.to_string(),
            },
        );
        self
    }

    pub fn with_channel(self, id: u64, name: &str, kind: ChannelKind) -> Self {
        self.state.lock().unwrap().channels.insert(
            id,
            ChannelInfo {
                id,
                name: name.to_string(),
                kind,
            },
        );
        self
    }

    pub fn with_members(self, guild_id: u64, members: Vec<MemberPresence>) -> Self {
        self.state.lock().unwrap().members.insert(guild_id, members);
        self
    }

    pub fn with_messages(self, channel_id: u64, messages: Vec<MessageRecord>) -> Self {
        self.state
            .lock()
            .unwrap()
            .messages
            .insert(channel_id, messages);
        self
    }

    pub fn with_user(self, user: UserProfile) -> Self {
        self.state.lock().unwrap().users.insert(user.id, user);
        self
    }

    /// Makes every subsequent call fail with `UpstreamError::Api(reason)`.
    pub fn fail_all(&self, reason: &str) {
        self.state.lock().unwrap().fail_all = Some(reason.to_string());
    }

    /// Snapshot of the per-operation call counters.
    pub fn counts(&self) -> CallCounts {
        self.state.lock().unwrap().counts
    }

    /// Embeds posted through [`DiscordApi::send_embed`], in call order.
    pub fn sent_embeds(&self) -> Vec<(u64, EmbedSpec)> {
        self.state.lock().unwrap().sent_embeds.clone()
    }

    fn check_fail(&self) -> Result<(), UpstreamError> {
        match &self.state.lock().unwrap().fail_all {
            Some(reason) => Err(UpstreamError::Api(reason.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DiscordApi for MockDiscordApi {
    async fn fetch_guild(&self, _token: &str, guild_id: u64) -> Result<GuildSummary, UpstreamError> {
        self.state.lock().unwrap().counts.fetch_guild += 1;
        self.check_fail()?;
        self.state
            .lock()
            .unwrap()
            .guilds
            .get(&guild_id)
            .cloned()
            .ok_or(UpstreamError::NotFound {
                kind: "guild",
                id: guild_id,
            })
    }

    async fn fetch_channel(
        &self,
        _token: &str,
        channel_id: u64,
    ) -> Result<ChannelInfo, UpstreamError> {
        self.state.lock().unwrap().counts.fetch_channel += 1;
        self.check_fail()?;
        self.state
            .lock()
            .unwrap()
            .channels
            .get(&channel_id)
            .cloned()
            .ok_or(UpstreamError::NotFound {
                kind: "channel",
                id: channel_id,
            })
    }

    async fn fetch_members(
        &self,
        _token: &str,
        guild_id: u64,
    ) -> Result<Vec<MemberPresence>, UpstreamError> {
        self.state.lock().unwrap().counts.fetch_members += 1;
        self.check_fail()?;
        self.state
            .lock()
            .unwrap()
            .members
            .get(&guild_id)
            .cloned()
            .ok_or(UpstreamError::NotFound {
                kind: "guild",
                id: guild_id,
            })
    }

    async fn fetch_messages(
        &self,
        _token: &str,
        channel_id: u64,
        limit: usize,
    ) -> Result<Vec<MessageRecord>, UpstreamError> {
        self.state.lock().unwrap().counts.fetch_messages += 1;
        self.check_fail()?;
        let state = self.state.lock().unwrap();
        let Some(messages) = state.messages.get(&channel_id) else {
            return Err(UpstreamError::NotFound {
                kind: "channel",
                id: channel_id,
            });
        };
        Ok(messages.iter().take(limit).cloned().collect())
    }

    async fn fetch_user(&self, _token: &str, user_id: u64) -> Result<UserProfile, UpstreamError> {
        self.state.lock().unwrap().counts.fetch_user += 1;
        self.check_fail()?;
        self.state
            .lock()
            .unwrap()
            .users
            .get(&user_id)
            .cloned()
            .ok_or(UpstreamError::NotFound {
                kind: "user",
                id: user_id,
            })
    }

    async fn send_embed(
        &self,
        _token: &str,
        channel_id: u64,
        embed: &EmbedSpec,
    ) -> Result<u64, UpstreamError> {
        self.state.lock().unwrap().counts.send_embed += 1;
        self.check_fail()?;
        let mut state = self.state.lock().unwrap();
        if !state.channels.contains_key(&channel_id) {
            return Err(UpstreamError::NotFound {
                kind: "channel",
                id: channel_id,
            });
        }
        state.sent_embeds.push((channel_id, embed.clone()));
        Ok(state.sent_embeds.len() as u64)
    }
}
