//! Mock voice connector with manually-fired completion events.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use capability::{
    MediaError, PlaybackEvent, TrackSource, VoiceConnector, VoiceHandle, VoiceSession,
};
use tokio::sync::mpsc;

/// Observer for one mock voice connection.
///
/// A probe is created per [`VoiceConnector::connect`] call and shared with the
/// handle given to the code under test, so the test can both inspect what was
/// played and drive the completion channel.
#[derive(Clone)]
pub struct VoiceProbe {
    pub guild_id: u64,
    pub channel_id: u64,
    played: Arc<Mutex<Vec<TrackSource>>>,
    fail_next_play: Arc<AtomicBool>,
    disconnected: Arc<AtomicBool>,
    completions: mpsc::Sender<PlaybackEvent>,
}

impl VoiceProbe {
    /// Tracks played so far, in play order.
    pub fn played(&self) -> Vec<TrackSource> {
        self.played.lock().unwrap().clone()
    }

    /// Whether the handle was disconnected.
    pub fn disconnected(&self) -> bool {
        self.disconnected.load(Ordering::SeqCst)
    }

    /// Makes the next `play` call fail with a playback error.
    pub fn fail_next_play(&self) {
        self.fail_next_play.store(true, Ordering::SeqCst);
    }

    /// Fires a track-finished completion event.
    pub async fn finish_track(&self) {
        let _ = self.completions.send(PlaybackEvent::Finished).await;
    }

    /// Fires a mid-stream failure completion event.
    pub async fn fail_track(&self) {
        let _ = self.completions.send(PlaybackEvent::Failed).await;
    }
}

struct MockVoiceHandle {
    probe: VoiceProbe,
}

#[async_trait]
impl VoiceHandle for MockVoiceHandle {
    async fn play(&mut self, track: &TrackSource) -> Result<(), MediaError> {
        if self.probe.fail_next_play.swap(false, Ordering::SeqCst) {
            return Err(MediaError::Playback("scripted track failure".to_string()));
        }
        self.probe.played.lock().unwrap().push(track.clone());
        Ok(())
    }

    async fn disconnect(&mut self) {
        self.probe.disconnected.store(true, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct ConnectorState {
    probes: Vec<VoiceProbe>,
    fail_connect: bool,
    arm_play_failure: bool,
}

/// Mock [`VoiceConnector`]; every successful connect yields a [`VoiceProbe`].
#[derive(Clone, Default)]
pub struct MockVoiceConnector {
    state: Arc<Mutex<ConnectorState>>,
}

impl MockVoiceConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent connect attempts fail with a gateway error.
    pub fn fail_connects(&self) {
        self.state.lock().unwrap().fail_connect = true;
    }

    /// Arms the next connection so its first `play` call fails. One-shot:
    /// covers the window between connect and first play that a test cannot
    /// reach through a probe.
    pub fn fail_next_play_on_connect(&self) {
        self.state.lock().unwrap().arm_play_failure = true;
    }

    pub fn connect_count(&self) -> usize {
        self.state.lock().unwrap().probes.len()
    }

    /// Probe for the n-th successful connection (0-based).
    pub fn probe(&self, index: usize) -> Option<VoiceProbe> {
        self.state.lock().unwrap().probes.get(index).cloned()
    }
}

#[async_trait]
impl VoiceConnector for MockVoiceConnector {
    async fn connect(
        &self,
        _token: &str,
        guild_id: u64,
        channel_id: u64,
    ) -> Result<VoiceSession, MediaError> {
        let arm_play_failure = {
            let mut state = self.state.lock().unwrap();
            if state.fail_connect {
                return Err(MediaError::Gateway("scripted connect failure".to_string()));
            }
            std::mem::take(&mut state.arm_play_failure)
        };

        let (tx, rx) = mpsc::channel(8);
        let probe = VoiceProbe {
            guild_id,
            channel_id,
            played: Arc::new(Mutex::new(Vec::new())),
            fail_next_play: Arc::new(AtomicBool::new(arm_play_failure)),
            disconnected: Arc::new(AtomicBool::new(false)),
            completions: tx,
        };
        self.state.lock().unwrap().probes.push(probe.clone());

        Ok(VoiceSession {
            handle: Box::new(MockVoiceHandle { probe }),
            completions: rx,
        })
    }
}
