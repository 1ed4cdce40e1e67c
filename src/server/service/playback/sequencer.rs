//! Drives playback sessions from first track to teardown.
//!
//! The sequencer owns the only code path that starts tracks and advances
//! queues. Each session gets one driver task that consumes the session's
//! completion channel and a wall-clock deadline; every completion event is
//! handled exactly once, and a session never has more than one active track.

use std::sync::Arc;
use std::time::Duration;

use capability::{
    CompletionReceiver, MediaError, PlaybackEvent, TrackSource, VoiceConnector, VoiceSession,
};
use tokio::time::Instant;

use crate::server::error::AppError;

use super::{registry::PlaybackSession, SessionError, SessionRegistry};

/// Upper bound on a session's lifetime, applied regardless of playback
/// state. Bounds leaked connections when a client never drains its queue.
pub const SESSION_MAX_LIFETIME: Duration = Duration::from_secs(60 * 60);

/// Outcome of handling one track-completion event.
#[derive(Debug)]
pub(crate) enum Advance {
    /// The next queued track was started.
    Continued(TrackSource),
    /// The queue was empty; the session was torn down.
    Drained,
    /// Starting the next track failed; the whole session was torn down.
    /// A failed track points at the track source, not at queue management,
    /// so no further queued track is attempted.
    Aborted(MediaError),
    /// The session was already gone.
    Gone,
}

/// Sequences track playback for all sessions.
#[derive(Clone)]
pub struct PlaybackSequencer {
    registry: SessionRegistry,
    connector: Arc<dyn VoiceConnector>,
}

impl PlaybackSequencer {
    pub fn new(registry: SessionRegistry, connector: Arc<dyn VoiceConnector>) -> Self {
        Self {
            registry,
            connector,
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Creates a session for the guild, starts the first track and arms the
    /// session's driver. Returns the new session identifier.
    pub async fn begin(
        &self,
        token: &str,
        guild_id: u64,
        channel_id: u64,
        track: TrackSource,
    ) -> Result<String, AppError> {
        self.begin_with_lifetime(token, guild_id, channel_id, track, SESSION_MAX_LIFETIME)
            .await
    }

    pub(crate) async fn begin_with_lifetime(
        &self,
        token: &str,
        guild_id: u64,
        channel_id: u64,
        track: TrackSource,
        lifetime: Duration,
    ) -> Result<String, AppError> {
        // Duplicate-session check before the connection is opened, so the
        // common conflict case performs no external call.
        if self.registry.guild_session(guild_id).await.is_some() {
            return Err(SessionError::GuildBusy(guild_id).into());
        }

        let VoiceSession {
            mut handle,
            completions,
        } = self.connector.connect(token, guild_id, channel_id).await?;

        if let Err(err) = handle.play(&track).await {
            handle.disconnect().await;
            return Err(err.into());
        }

        let session_id = SessionRegistry::generate_session_id();
        let session = PlaybackSession::new(
            session_id.clone(),
            guild_id,
            channel_id,
            track,
            handle,
        );

        if let Err(mut rejected) = self.registry.register(session).await {
            // Lost a creation race while connecting; release the fresh
            // connection and report the conflict.
            rejected.handle.disconnect().await;
            return Err(SessionError::GuildBusy(guild_id).into());
        }

        let sequencer = self.clone();
        let driver_session = session_id.clone();
        tokio::spawn(async move {
            sequencer.drive(driver_session, completions, lifetime).await;
        });

        Ok(session_id)
    }

    /// Appends a track to an existing session's queue and returns the new
    /// queue length. Playback is not touched; the driver picks the track up
    /// when the current one completes.
    pub async fn enqueue(
        &self,
        session_id: &str,
        track: TrackSource,
    ) -> Result<usize, SessionError> {
        self.registry.enqueue(session_id, track).await
    }

    /// Handles one track-completion event for a session: pops and starts the
    /// next queued track, or tears the session down when the queue is empty.
    pub(crate) async fn handle_track_end(&self, session_id: &str) -> Advance {
        let mut sessions = self.registry.sessions.write().await;
        let Some(session) = sessions.get_mut(session_id) else {
            return Advance::Gone;
        };

        match session.queue.pop_front() {
            Some(next) => match session.handle.play(&next).await {
                Ok(()) => {
                    session.now_playing = Some(next.clone());
                    Advance::Continued(next)
                }
                Err(err) => {
                    if let Some(mut session) = sessions.remove(session_id) {
                        drop(sessions);
                        session.handle.disconnect().await;
                    }
                    Advance::Aborted(err)
                }
            },
            None => {
                if let Some(mut session) = sessions.remove(session_id) {
                    drop(sessions);
                    session.handle.disconnect().await;
                }
                Advance::Drained
            }
        }
    }

    /// Per-session driver: consumes completion events until the queue drains,
    /// a track fails, the connection dies, or the lifetime deadline passes.
    async fn drive(self, session_id: String, mut completions: CompletionReceiver, lifetime: Duration) {
        let deadline = Instant::now() + lifetime;

        loop {
            tokio::select! {
                event = completions.recv() => match event {
                    Some(PlaybackEvent::Finished) => {
                        match self.handle_track_end(&session_id).await {
                            Advance::Continued(track) => {
                                tracing::debug!(
                                    "Session {} advanced to {}",
                                    session_id,
                                    track.url
                                );
                            }
                            Advance::Drained => {
                                tracing::info!("Session {} drained its queue", session_id);
                                break;
                            }
                            Advance::Aborted(err) => {
                                tracing::error!(
                                    "Session {} aborted, failed to start next track: {}",
                                    session_id,
                                    err
                                );
                                break;
                            }
                            Advance::Gone => break,
                        }
                    }
                    Some(PlaybackEvent::Failed) => {
                        tracing::error!(
                            "Track failed mid-stream, tearing down session {}",
                            session_id
                        );
                        self.registry.remove(&session_id).await;
                        break;
                    }
                    // Channel closed: the connection backing the session is
                    // gone, nothing further will complete.
                    None => {
                        self.registry.remove(&session_id).await;
                        break;
                    }
                },
                _ = tokio::time::sleep_until(deadline) => {
                    tracing::warn!(
                        "Session {} exceeded maximum lifetime, tearing down",
                        session_id
                    );
                    self.registry.remove(&session_id).await;
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::mock::MockVoiceConnector;

    fn sequencer() -> (PlaybackSequencer, MockVoiceConnector) {
        let connector = MockVoiceConnector::new();
        let sequencer = PlaybackSequencer::new(
            SessionRegistry::new(),
            Arc::new(connector.clone()),
        );
        (sequencer, connector)
    }

    fn track(url: &str) -> TrackSource {
        TrackSource::new(url)
    }

    /// Polls an assertion until it holds or a second elapses. The driver
    /// task runs concurrently, so registry effects are not instantaneous.
    async fn wait_for<F>(mut condition: F)
    where
        F: FnMut() -> bool,
    {
        for _ in 0..100 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached within 1s");
    }

    /// Tests that beginning playback registers a session playing the first
    /// track with an empty queue.
    ///
    /// Expected: Ok with session playing track A, queue empty, one connect
    #[tokio::test]
    async fn begin_creates_playing_session() {
        let (sequencer, connector) = sequencer();

        let id = sequencer
            .begin("token", 10, 2, track("https://cdn.example/a.mp3"))
            .await
            .unwrap();

        let snapshot = sequencer.registry().snapshot(&id).await.unwrap();
        assert_eq!(snapshot.guild_id, 10);
        assert_eq!(snapshot.channel_id, 2);
        assert_eq!(
            snapshot.now_playing,
            Some(track("https://cdn.example/a.mp3"))
        );
        assert!(snapshot.queue.is_empty());

        assert_eq!(connector.connect_count(), 1);
        assert_eq!(
            connector.probe(0).unwrap().played(),
            vec![track("https://cdn.example/a.mp3")]
        );
    }

    /// Tests that a second session for a guild with an active one is
    /// rejected before any connection is opened.
    ///
    /// Expected: Err(GuildBusy), connect count still 1
    #[tokio::test]
    async fn begin_conflicts_for_busy_guild() {
        let (sequencer, connector) = sequencer();
        sequencer
            .begin("token", 10, 2, track("https://cdn.example/a.mp3"))
            .await
            .unwrap();

        let result = sequencer
            .begin("token", 10, 2, track("https://cdn.example/b.mp3"))
            .await;

        assert!(matches!(
            result,
            Err(AppError::SessionErr(SessionError::GuildBusy(10)))
        ));
        assert_eq!(connector.connect_count(), 1);
        assert_eq!(sequencer.registry().len().await, 1);
    }

    /// Tests that a failing first track tears the connection down and leaves
    /// no session behind.
    ///
    /// Expected: Err(MediaErr), registry empty, connection released
    #[tokio::test]
    async fn begin_play_failure_leaves_no_session() {
        let (sequencer, connector) = sequencer();
        connector.fail_next_play_on_connect();

        let result = sequencer
            .begin("token", 10, 2, track("https://cdn.example/a.mp3"))
            .await;

        assert!(matches!(result, Err(AppError::MediaErr(_))));
        assert!(sequencer.registry().is_empty().await);
        assert!(connector.probe(0).unwrap().disconnected());
    }

    /// Tests the full scenario: play A, enqueue B, complete twice.
    ///
    /// Expected: queue [B] after enqueue; after the first completion B plays
    /// with an empty queue; after the second the session is gone and a
    /// repeated removal is a no-op
    #[tokio::test]
    async fn completion_advances_then_drains() {
        let (sequencer, connector) = sequencer();
        let id = sequencer
            .begin("token", 10, 2, track("https://cdn.example/a.mp3"))
            .await
            .unwrap();

        let len = sequencer
            .enqueue(&id, track("https://cdn.example/b.mp3"))
            .await
            .unwrap();
        assert_eq!(len, 1);

        let advance = sequencer.handle_track_end(&id).await;
        assert!(matches!(advance, Advance::Continued(_)));

        let snapshot = sequencer.registry().snapshot(&id).await.unwrap();
        assert_eq!(
            snapshot.now_playing,
            Some(track("https://cdn.example/b.mp3"))
        );
        assert!(snapshot.queue.is_empty());
        assert_eq!(
            connector.probe(0).unwrap().played(),
            vec![
                track("https://cdn.example/a.mp3"),
                track("https://cdn.example/b.mp3"),
            ]
        );

        let advance = sequencer.handle_track_end(&id).await;
        assert!(matches!(advance, Advance::Drained));
        assert!(sequencer.registry().is_empty().await);
        assert!(connector.probe(0).unwrap().disconnected());

        assert!(!sequencer.registry().remove(&id).await);
    }

    /// Tests that each completion pops exactly one track, preserving
    /// arrival order across the whole queue.
    ///
    /// Expected: play order equals enqueue order, one pop per completion
    #[tokio::test]
    async fn completions_pop_exactly_one_track_in_order() {
        let (sequencer, connector) = sequencer();
        let id = sequencer
            .begin("token", 10, 2, track("https://cdn.example/a.mp3"))
            .await
            .unwrap();

        for url in ["https://cdn.example/b.mp3", "https://cdn.example/c.mp3"] {
            sequencer.enqueue(&id, track(url)).await.unwrap();
        }

        sequencer.handle_track_end(&id).await;
        let snapshot = sequencer.registry().snapshot(&id).await.unwrap();
        assert_eq!(snapshot.queue.len(), 1);

        sequencer.handle_track_end(&id).await;
        let snapshot = sequencer.registry().snapshot(&id).await.unwrap();
        assert!(snapshot.queue.is_empty());

        assert_eq!(
            connector.probe(0).unwrap().played(),
            vec![
                track("https://cdn.example/a.mp3"),
                track("https://cdn.example/b.mp3"),
                track("https://cdn.example/c.mp3"),
            ]
        );
    }

    /// Tests that a track failing to start aborts the whole session instead
    /// of skipping to the next queued track.
    ///
    /// Expected: Aborted, session removed, connection released, C not played
    #[tokio::test]
    async fn advance_failure_aborts_session() {
        let (sequencer, connector) = sequencer();
        let id = sequencer
            .begin("token", 10, 2, track("https://cdn.example/a.mp3"))
            .await
            .unwrap();
        sequencer
            .enqueue(&id, track("https://cdn.example/b.mp3"))
            .await
            .unwrap();
        sequencer
            .enqueue(&id, track("https://cdn.example/c.mp3"))
            .await
            .unwrap();

        let probe = connector.probe(0).unwrap();
        probe.fail_next_play();

        let advance = sequencer.handle_track_end(&id).await;
        assert!(matches!(advance, Advance::Aborted(_)));
        assert!(sequencer.registry().is_empty().await);
        assert!(probe.disconnected());
        assert_eq!(probe.played(), vec![track("https://cdn.example/a.mp3")]);
    }

    /// Tests that enqueueing against an unknown session yields NotFound and
    /// never creates a session.
    ///
    /// Expected: Err(NotFound), registry empty
    #[tokio::test]
    async fn enqueue_unknown_session_is_not_found() {
        let (sequencer, _connector) = sequencer();

        let result = sequencer
            .enqueue("missing", track("https://cdn.example/a.mp3"))
            .await;

        assert!(matches!(result, Err(SessionError::NotFound(_))));
        assert!(sequencer.registry().is_empty().await);
    }

    /// Tests that the driver consumes completion events from the channel and
    /// advances the session without any direct call.
    ///
    /// Expected: B playing after the first event, session gone after the second
    #[tokio::test]
    async fn driver_consumes_completion_events() {
        let (sequencer, connector) = sequencer();
        let id = sequencer
            .begin("token", 10, 2, track("https://cdn.example/a.mp3"))
            .await
            .unwrap();
        sequencer
            .enqueue(&id, track("https://cdn.example/b.mp3"))
            .await
            .unwrap();

        let probe = connector.probe(0).unwrap();
        probe.finish_track().await;
        let played_probe = probe.clone();
        wait_for(move || played_probe.played().len() == 2).await;

        probe.finish_track().await;
        let registry = sequencer.registry().clone();
        wait_for(move || {
            registry
                .sessions
                .try_read()
                .map(|sessions| sessions.is_empty())
                .unwrap_or(false)
        })
        .await;
        assert!(probe.disconnected());
    }

    /// Tests that a mid-stream failure event tears the session down.
    ///
    /// Expected: session removed, connection released
    #[tokio::test]
    async fn driver_tears_down_on_failure_event() {
        let (sequencer, connector) = sequencer();
        sequencer
            .begin("token", 10, 2, track("https://cdn.example/a.mp3"))
            .await
            .unwrap();

        let probe = connector.probe(0).unwrap();
        probe.fail_track().await;

        let registry = sequencer.registry().clone();
        wait_for(move || {
            registry
                .sessions
                .try_read()
                .map(|sessions| sessions.is_empty())
                .unwrap_or(false)
        })
        .await;
        assert!(probe.disconnected());
    }

    /// Tests that the wall-clock lifetime bound removes a session that never
    /// drains its queue.
    ///
    /// Expected: session removed shortly after the deadline
    #[tokio::test]
    async fn driver_enforces_lifetime_deadline() {
        let (sequencer, connector) = sequencer();
        sequencer
            .begin_with_lifetime(
                "token",
                10,
                2,
                track("https://cdn.example/a.mp3"),
                Duration::from_millis(50),
            )
            .await
            .unwrap();

        let registry = sequencer.registry().clone();
        wait_for(move || {
            registry
                .sessions
                .try_read()
                .map(|sessions| sessions.is_empty())
                .unwrap_or(false)
        })
        .await;
        assert!(connector.probe(0).unwrap().disconnected());
    }
}
