//! Process-wide registry of active playback sessions.
//!
//! The registry holds every live session behind one `Arc<RwLock<_>>`; clones
//! share the map. Operations on different sessions proceed concurrently,
//! operations on the same session serialize on the write lock. Sessions live
//! for the process lifetime at most; nothing is persisted across restarts.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use capability::{TrackSource, VoiceHandle};
use rand::Rng;
use tokio::sync::RwLock;

use super::SessionError;

/// Length of generated session identifiers. 32 alphanumeric characters give
/// an identifier space well beyond 2^64, so collisions are negligible.
const SESSION_ID_LENGTH: usize = 32;

/// One active voice-playback context.
///
/// Owns the live connection exclusively; the handle is released exactly once,
/// when the session leaves the registry. The queue holds only not-yet-started
/// tracks, never the one currently playing.
pub struct PlaybackSession {
    pub id: String,
    pub guild_id: u64,
    pub channel_id: u64,
    pub now_playing: Option<TrackSource>,
    pub queue: VecDeque<TrackSource>,
    pub(super) handle: Box<dyn VoiceHandle>,
}

impl PlaybackSession {
    pub fn new(
        id: String,
        guild_id: u64,
        channel_id: u64,
        first_track: TrackSource,
        handle: Box<dyn VoiceHandle>,
    ) -> Self {
        Self {
            id,
            guild_id,
            channel_id,
            now_playing: Some(first_track),
            queue: VecDeque::new(),
            handle,
        }
    }
}

/// Read-only view of a session for responses and assertions.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub id: String,
    pub guild_id: u64,
    pub channel_id: u64,
    pub now_playing: Option<TrackSource>,
    pub queue: Vec<TrackSource>,
}

/// Authoritative mapping from session identifier to session state.
///
/// Cheap to clone; clones share the underlying map (same pattern as the
/// other in-memory services in this codebase).
#[derive(Clone, Default)]
pub struct SessionRegistry {
    pub(super) sessions: Arc<RwLock<HashMap<String, PlaybackSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates a random 32-character alphanumeric session identifier.
    pub fn generate_session_id() -> String {
        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ\
                                 abcdefghijklmnopqrstuvwxyz\
                                 0123456789";

        let mut rng = rand::rng();

        (0..SESSION_ID_LENGTH)
            .map(|_| {
                let idx = rng.random_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect()
    }

    /// Returns the session id currently registered for a guild, if any.
    pub async fn guild_session(&self, guild_id: u64) -> Option<String> {
        self.sessions
            .read()
            .await
            .values()
            .find(|s| s.guild_id == guild_id)
            .map(|s| s.id.clone())
    }

    /// Registers a new session.
    ///
    /// Re-checks the one-session-per-guild invariant under the write lock;
    /// the loser of a creation race gets its session handed back so the
    /// caller can release the freshly opened connection.
    pub(super) async fn register(
        &self,
        session: PlaybackSession,
    ) -> Result<(), PlaybackSession> {
        let mut sessions = self.sessions.write().await;
        if sessions.values().any(|s| s.guild_id == session.guild_id) {
            return Err(session);
        }
        tracing::info!(
            "Registered playback session {} for guild {}",
            session.id,
            session.guild_id
        );
        sessions.insert(session.id.clone(), session);
        Ok(())
    }

    /// Appends a track to a session's queue and returns the new queue length.
    ///
    /// Never starts playback. The whole operation is one non-suspending
    /// mutation under the write lock, so concurrent enqueues land in
    /// request-arrival order.
    pub async fn enqueue(
        &self,
        session_id: &str,
        track: TrackSource,
    ) -> Result<usize, SessionError> {
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.get_mut(session_id) else {
            return Err(SessionError::NotFound(session_id.to_string()));
        };
        session.queue.push_back(track);
        Ok(session.queue.len())
    }

    /// Read-only snapshot of a session.
    pub async fn snapshot(&self, session_id: &str) -> Option<SessionSnapshot> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map(|s| SessionSnapshot {
                id: s.id.clone(),
                guild_id: s.guild_id,
                channel_id: s.channel_id,
                now_playing: s.now_playing.clone(),
                queue: s.queue.iter().cloned().collect(),
            })
    }

    /// Removes a session and releases its connection. Idempotent: removing
    /// an unknown identifier is a no-op that returns false.
    pub async fn remove(&self, session_id: &str) -> bool {
        let removed = self.sessions.write().await.remove(session_id);
        match removed {
            Some(mut session) => {
                // Teardown is best-effort; the handle logs and swallows
                // failures to release the connection.
                session.handle.disconnect().await;
                tracing::info!(
                    "Removed playback session {} for guild {}",
                    session.id,
                    session.guild_id
                );
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    #[cfg(test)]
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capability::VoiceConnector;
    use test_utils::mock::MockVoiceConnector;

    async fn test_session(id: &str, guild_id: u64) -> PlaybackSession {
        let connector = MockVoiceConnector::new();
        let voice = connector.connect("token", guild_id, 2).await.unwrap();
        PlaybackSession::new(
            id.to_string(),
            guild_id,
            2,
            TrackSource::new("https://cdn.example/a.mp3"),
            voice.handle,
        )
    }

    /// Tests that generated session ids have the expected length and
    /// alphabet, and that two generations differ.
    ///
    /// Expected: 32 alphanumeric characters, distinct ids
    #[test]
    fn generates_random_session_ids() {
        let a = SessionRegistry::generate_session_id();
        let b = SessionRegistry::generate_session_id();

        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    /// Tests registering a session and looking it up by guild.
    ///
    /// Expected: Ok with the session visible in snapshots and guild lookup
    #[tokio::test]
    async fn registers_and_finds_session() {
        let registry = SessionRegistry::new();
        let session = test_session("abc", 10).await;

        assert!(registry.register(session).await.is_ok());
        assert_eq!(registry.len().await, 1);
        assert_eq!(registry.guild_session(10).await.as_deref(), Some("abc"));

        let snapshot = registry.snapshot("abc").await.unwrap();
        assert_eq!(snapshot.id, "abc");
        assert_eq!(snapshot.guild_id, 10);
        assert!(snapshot.queue.is_empty());
        assert_eq!(
            snapshot.now_playing,
            Some(TrackSource::new("https://cdn.example/a.mp3"))
        );
    }

    /// Tests that a second session for the same guild is rejected.
    ///
    /// Expected: Err handing the rejected session back
    #[tokio::test]
    async fn rejects_second_session_for_guild() {
        let registry = SessionRegistry::new();
        registry.register(test_session("abc", 10).await).await.ok();

        let rejected = registry.register(test_session("def", 10).await).await;
        assert!(rejected.is_err());
        assert_eq!(registry.len().await, 1);
    }

    /// Tests that enqueued tracks land in arrival order.
    ///
    /// Expected: Ok with queue lengths 1, 2, 3 and queue in enqueue order
    #[tokio::test]
    async fn enqueues_in_arrival_order() {
        let registry = SessionRegistry::new();
        registry.register(test_session("abc", 10).await).await.ok();

        let urls = [
            "https://cdn.example/b.mp3",
            "https://cdn.example/c.mp3",
            "https://cdn.example/d.mp3",
        ];
        for (i, url) in urls.iter().enumerate() {
            let len = registry.enqueue("abc", TrackSource::new(*url)).await.unwrap();
            assert_eq!(len, i + 1);
        }

        let snapshot = registry.snapshot("abc").await.unwrap();
        let queued: Vec<_> = snapshot.queue.iter().map(|t| t.url.as_str()).collect();
        assert_eq!(queued, urls);
    }

    /// Tests that enqueueing against an unknown session fails without
    /// creating one.
    ///
    /// Expected: Err(NotFound), registry unchanged
    #[tokio::test]
    async fn enqueue_unknown_session_is_not_found() {
        let registry = SessionRegistry::new();

        let result = registry
            .enqueue("missing", TrackSource::new("https://cdn.example/x.mp3"))
            .await;

        assert!(matches!(result, Err(SessionError::NotFound(_))));
        assert!(registry.is_empty().await);
    }

    /// Tests that removal releases the connection and is idempotent.
    ///
    /// Expected: first remove true and handle disconnected, second remove false
    #[tokio::test]
    async fn remove_is_idempotent_and_disconnects() {
        let connector = MockVoiceConnector::new();
        let voice = connector.connect("token", 10, 2).await.unwrap();
        let registry = SessionRegistry::new();
        registry
            .register(PlaybackSession::new(
                "abc".to_string(),
                10,
                2,
                TrackSource::new("https://cdn.example/a.mp3"),
                voice.handle,
            ))
            .await
            .ok();

        assert!(registry.remove("abc").await);
        assert!(connector.probe(0).unwrap().disconnected());
        assert!(registry.is_empty().await);

        assert!(!registry.remove("abc").await);
    }
}
