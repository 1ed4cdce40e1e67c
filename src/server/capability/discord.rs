//! Discord platform capability backed by Serenity.
//!
//! Every operation authenticates with the caller-supplied bot token, so REST
//! calls construct a fresh `Http` client per call. Presence data is not part
//! of any REST payload; `fetch_members` therefore runs a short-lived gateway
//! session with the presences intent and shuts it down as soon as the guild
//! has been delivered.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use capability::{
    AttachmentRecord, ChannelInfo, ChannelKind, DiscordApi, EmbedSpec, GuildSummary,
    MemberPresence, MessageRecord, UpstreamError, UserProfile,
};
use chrono::{DateTime, Utc};
use serenity::all::{
    Channel, ChannelId, ChannelType, Client, Context, CreateEmbed, CreateEmbedAuthor,
    CreateEmbedFooter, CreateMessage, EventHandler, GatewayIntents, GetMessages, Guild, GuildId,
    Message, OnlineStatus, UserId,
};
use serenity::http::{Http, HttpError};
use tokio::sync::oneshot;

/// How long the presence probe waits for the gateway to deliver the guild.
const GATEWAY_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Page size of the message-history REST endpoint.
const MESSAGE_PAGE_SIZE: u8 = 100;

/// [`DiscordApi`] backed by Serenity's REST client and, for presences, a
/// short-lived gateway session.
#[derive(Clone, Default)]
pub struct SerenityDiscord;

impl SerenityDiscord {
    pub fn new() -> Self {
        Self
    }
}

/// Maps a Serenity error to the capability error kind, turning an upstream
/// 404 into the absent-object variant.
fn map_discord_error(err: serenity::Error, kind: &'static str, id: u64) -> UpstreamError {
    if let serenity::Error::Http(HttpError::UnsuccessfulRequest(ref response)) = err {
        if response.status_code.as_u16() == 404 {
            return UpstreamError::NotFound { kind, id };
        }
    }
    UpstreamError::Api(err.to_string())
}

fn map_channel(channel: Channel, channel_id: u64) -> Result<ChannelInfo, UpstreamError> {
    match channel {
        Channel::Guild(channel) => {
            let kind = match channel.kind {
                ChannelType::Text => ChannelKind::Text,
                ChannelType::Voice => ChannelKind::Voice,
                _ => ChannelKind::Other,
            };
            Ok(ChannelInfo {
                id: channel.id.get(),
                name: channel.name,
                kind,
            })
        }
        _ => Err(UpstreamError::NotFound {
            kind: "channel",
            id: channel_id,
        }),
    }
}

fn map_message(message: Message) -> MessageRecord {
    let timestamp = DateTime::from_timestamp(message.timestamp.unix_timestamp(), 0)
        .unwrap_or(DateTime::UNIX_EPOCH);

    MessageRecord {
        id: message.id.get(),
        author_id: message.author.id.get(),
        author_avatar_url: message.author.avatar_url(),
        author_bot: message.author.bot,
        author_name: message.author.name.clone(),
        content: message.content,
        timestamp: timestamp.with_timezone(&Utc),
        attachments: message
            .attachments
            .into_iter()
            .map(|a| AttachmentRecord {
                filename: a.filename,
                url: a.url,
            })
            .collect(),
    }
}

/// Gateway event handler that captures one guild's members and presences,
/// then asks the shard to shut down.
struct PresenceProbe {
    guild_id: u64,
    sender: Mutex<Option<oneshot::Sender<Result<Vec<MemberPresence>, UpstreamError>>>>,
}

impl PresenceProbe {
    fn deliver(&self, result: Result<Vec<MemberPresence>, UpstreamError>) {
        if let Some(tx) = self.sender.lock().ok().and_then(|mut guard| guard.take()) {
            let _ = tx.send(result);
        }
    }
}

#[serenity::async_trait]
impl EventHandler for PresenceProbe {
    async fn guild_create(&self, ctx: Context, guild: Guild, _is_new: Option<bool>) {
        if guild.id.get() != self.guild_id {
            return;
        }

        // The guild payload only caches a subset of members; fetch the full
        // list over REST and join it against the gateway presences.
        let members = match ctx.http.get_guild_members(guild.id, None, None).await {
            Ok(members) => members,
            Err(err) => {
                self.deliver(Err(map_discord_error(err, "guild", self.guild_id)));
                ctx.shard.shutdown_clean();
                return;
            }
        };

        let presences = &guild.presences;
        let result = members
            .into_iter()
            .map(|member| MemberPresence {
                user_id: member.user.id.get(),
                username: member.user.name.clone(),
                online: presences
                    .get(&member.user.id)
                    .map(|presence| presence.status == OnlineStatus::Online)
                    .unwrap_or(false),
            })
            .collect();

        self.deliver(Ok(result));
        ctx.shard.shutdown_clean();
    }
}

#[async_trait]
impl DiscordApi for SerenityDiscord {
    async fn fetch_guild(&self, token: &str, guild_id: u64) -> Result<GuildSummary, UpstreamError> {
        let http = Http::new(token);
        let guild = http
            .get_guild(GuildId::new(guild_id))
            .await
            .map_err(|err| map_discord_error(err, "guild", guild_id))?;

        Ok(GuildSummary {
            id: guild.id.get(),
            name: guild.name,
        })
    }

    async fn fetch_channel(
        &self,
        token: &str,
        channel_id: u64,
    ) -> Result<ChannelInfo, UpstreamError> {
        let http = Http::new(token);
        let channel = http
            .get_channel(ChannelId::new(channel_id))
            .await
            .map_err(|err| map_discord_error(err, "channel", channel_id))?;

        map_channel(channel, channel_id)
    }

    async fn fetch_members(
        &self,
        token: &str,
        guild_id: u64,
    ) -> Result<Vec<MemberPresence>, UpstreamError> {
        let (tx, rx) = oneshot::channel();
        let probe = PresenceProbe {
            guild_id,
            sender: Mutex::new(Some(tx)),
        };

        let intents = GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MEMBERS
            | GatewayIntents::GUILD_PRESENCES;
        let mut client = Client::builder(token, intents)
            .event_handler(probe)
            .await
            .map_err(|err| UpstreamError::Api(err.to_string()))?;

        let shard_manager = client.shard_manager.clone();
        tokio::spawn(async move {
            if let Err(err) = client.start().await {
                tracing::debug!("Presence probe gateway ended: {}", err);
            }
        });

        let outcome = tokio::time::timeout(GATEWAY_PROBE_TIMEOUT, rx).await;
        shard_manager.shutdown_all().await;

        match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(UpstreamError::Api(
                "gateway connection closed before the guild became available".to_string(),
            )),
            // No guild_create within the window: the bot is not in the
            // guild (or cannot see it), which reads as absence to callers.
            Err(_) => Err(UpstreamError::NotFound {
                kind: "guild",
                id: guild_id,
            }),
        }
    }

    async fn fetch_messages(
        &self,
        token: &str,
        channel_id: u64,
        limit: usize,
    ) -> Result<Vec<MessageRecord>, UpstreamError> {
        let http = Http::new(token);
        let channel = ChannelId::new(channel_id);

        let mut collected: Vec<Message> = Vec::with_capacity(limit);
        while collected.len() < limit {
            let page_size = (limit - collected.len()).min(MESSAGE_PAGE_SIZE as usize) as u8;
            let mut request = GetMessages::new().limit(page_size);
            if let Some(oldest) = collected.last() {
                request = request.before(oldest.id);
            }

            let page = channel
                .messages(&http, request)
                .await
                .map_err(|err| map_discord_error(err, "channel", channel_id))?;
            let exhausted = page.len() < page_size as usize;
            collected.extend(page);
            if exhausted {
                break;
            }
        }

        // The REST endpoint yields newest-first; transcripts read
        // oldest-first.
        collected.reverse();
        Ok(collected.into_iter().map(map_message).collect())
    }

    async fn fetch_user(&self, token: &str, user_id: u64) -> Result<UserProfile, UpstreamError> {
        let http = Http::new(token);
        let user = http
            .get_user(UserId::new(user_id))
            .await
            .map_err(|err| map_discord_error(err, "user", user_id))?;

        Ok(UserProfile {
            id: user.id.get(),
            avatar_url: user.avatar_url(),
            bot: user.bot,
            username: user.name,
        })
    }

    async fn send_embed(
        &self,
        token: &str,
        channel_id: u64,
        embed: &EmbedSpec,
    ) -> Result<u64, UpstreamError> {
        let http = Http::new(token);

        let mut builder = CreateEmbed::new();
        if let Some(title) = &embed.title {
            builder = builder.title(title.as_str());
        }
        if let Some(description) = &embed.description {
            builder = builder.description(description.as_str());
        }
        if let Some(color) = embed.color {
            builder = builder.colour(color);
        }
        if let Some(url) = &embed.url {
            builder = builder.url(url.as_str());
        }
        if let Some(footer) = &embed.footer_text {
            builder = builder.footer(CreateEmbedFooter::new(footer.as_str()));
        }
        if let Some(image) = &embed.image_url {
            builder = builder.image(image.as_str());
        }
        if let Some(thumbnail) = &embed.thumbnail_url {
            builder = builder.thumbnail(thumbnail.as_str());
        }
        if let Some(author) = &embed.author_name {
            let mut author_builder = CreateEmbedAuthor::new(author.as_str());
            if let Some(icon) = &embed.author_icon_url {
                author_builder = author_builder.icon_url(icon.as_str());
            }
            builder = builder.author(author_builder);
        }
        for field in &embed.fields {
            builder = builder.field(field.name.as_str(), field.value.as_str(), field.inline);
        }

        let message = ChannelId::new(channel_id)
            .send_message(&http, CreateMessage::new().embed(builder))
            .await
            .map_err(|err| map_discord_error(err, "channel", channel_id))?;

        Ok(message.id.get())
    }
}
