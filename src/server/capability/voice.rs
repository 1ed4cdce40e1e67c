//! Voice capability backed by Songbird.
//!
//! Each playback session gets its own gateway client (logged in with the
//! caller's bot token) with a Songbird voice manager attached, mirroring the
//! one-client-per-request model the service has always used. Track lifecycle
//! events are forwarded from Songbird's track events into the session's
//! completion channel; tearing the session down leaves the voice channel and
//! shuts the gateway client down.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use capability::{
    MediaError, PlaybackEvent, TrackSource, VoiceConnector, VoiceHandle, VoiceSession,
};
use serenity::all::{ChannelId, Client, Context, EventHandler, GatewayIntents, GuildId, Ready};
use serenity::gateway::ShardManager;
use songbird::events::{Event, EventContext, EventHandler as VoiceEventHandler, TrackEvent};
use songbird::input::HttpRequest;
use songbird::{Call, Songbird};
use tokio::sync::{mpsc, oneshot};

/// How long to wait for the per-session gateway client to become ready.
const GATEWAY_READY_TIMEOUT: Duration = Duration::from_secs(30);

/// Event buffer per session; one track completes at a time, so this never
/// fills in practice.
const COMPLETION_CHANNEL_CAPACITY: usize = 8;

/// [`VoiceConnector`] that brings up a Songbird-managed gateway client per
/// session.
pub struct SongbirdConnector {
    http: reqwest::Client,
}

impl SongbirdConnector {
    /// The reqwest client streams the remote audio into the transcoder.
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

/// Signals the moment the gateway session is ready for a voice join.
struct ReadyProbe {
    sender: Mutex<Option<oneshot::Sender<()>>>,
}

#[serenity::async_trait]
impl EventHandler for ReadyProbe {
    async fn ready(&self, _ctx: Context, _ready: Ready) {
        if let Some(tx) = self.sender.lock().ok().and_then(|mut guard| guard.take()) {
            let _ = tx.send(());
        }
    }
}

/// Forwards one kind of Songbird track event into the completion channel.
struct CompletionNotifier {
    events: mpsc::Sender<PlaybackEvent>,
    event: PlaybackEvent,
}

#[async_trait]
impl VoiceEventHandler for CompletionNotifier {
    async fn act(&self, _ctx: &EventContext<'_>) -> Option<Event> {
        if self.events.try_send(self.event).is_err() {
            tracing::warn!("Dropped a playback completion event; receiver gone");
        }
        None
    }
}

struct SongbirdHandle {
    call: Arc<tokio::sync::Mutex<Call>>,
    shard_manager: Arc<ShardManager>,
    http: reqwest::Client,
    events: mpsc::Sender<PlaybackEvent>,
}

#[async_trait]
impl VoiceHandle for SongbirdHandle {
    async fn play(&mut self, track: &TrackSource) -> Result<(), MediaError> {
        let input = HttpRequest::new(self.http.clone(), track.url.clone());
        let handle = self.call.lock().await.play_input(input.into());

        handle
            .add_event(
                Event::Track(TrackEvent::End),
                CompletionNotifier {
                    events: self.events.clone(),
                    event: PlaybackEvent::Finished,
                },
            )
            .map_err(|err| MediaError::Playback(err.to_string()))?;
        handle
            .add_event(
                Event::Track(TrackEvent::Error),
                CompletionNotifier {
                    events: self.events.clone(),
                    event: PlaybackEvent::Failed,
                },
            )
            .map_err(|err| MediaError::Playback(err.to_string()))?;

        tracing::info!("Started playback of {}", track.url);
        Ok(())
    }

    async fn disconnect(&mut self) {
        if let Err(err) = self.call.lock().await.leave().await {
            tracing::warn!("Failed to leave voice channel: {}", err);
        }
        self.shard_manager.shutdown_all().await;
    }
}

#[async_trait]
impl VoiceConnector for SongbirdConnector {
    async fn connect(
        &self,
        token: &str,
        guild_id: u64,
        channel_id: u64,
    ) -> Result<VoiceSession, MediaError> {
        let manager = Songbird::serenity();

        let (ready_tx, ready_rx) = oneshot::channel();
        let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_VOICE_STATES;
        let mut client = Client::builder(token, intents)
            .event_handler(ReadyProbe {
                sender: Mutex::new(Some(ready_tx)),
            })
            .voice_manager_arc(manager.clone())
            .await
            .map_err(|err| MediaError::Gateway(err.to_string()))?;

        let shard_manager = client.shard_manager.clone();
        tokio::spawn(async move {
            if let Err(err) = client.start().await {
                tracing::error!("Voice session gateway error: {}", err);
            }
        });

        // The voice join needs a running shard; wait for ready first.
        if tokio::time::timeout(GATEWAY_READY_TIMEOUT, ready_rx)
            .await
            .map(|received| received.is_err())
            .unwrap_or(true)
        {
            shard_manager.shutdown_all().await;
            return Err(MediaError::Gateway(
                "timed out waiting for the gateway session to become ready".to_string(),
            ));
        }

        let call = match manager
            .join(GuildId::new(guild_id), ChannelId::new(channel_id))
            .await
        {
            Ok(call) => call,
            Err(err) => {
                shard_manager.shutdown_all().await;
                return Err(MediaError::Join(err.to_string()));
            }
        };

        tracing::info!(
            "Joined voice channel {} in guild {}",
            channel_id,
            guild_id
        );

        let (events_tx, events_rx) = mpsc::channel(COMPLETION_CHANNEL_CAPACITY);
        Ok(VoiceSession {
            handle: Box::new(SongbirdHandle {
                call,
                shard_manager,
                http: self.http.clone(),
                events: events_tx,
            }),
            completions: events_rx,
        })
    }
}
