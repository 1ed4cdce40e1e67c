//! Call-counting mock of the card renderer.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use capability::{CardOptions, CardRenderer, CardSubject, MediaError, RankData};

/// PNG magic bytes; enough for callers that only persist the artifact.
const PLACEHOLDER_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Mock [`CardRenderer`] returning placeholder bytes.
#[derive(Clone, Default)]
pub struct MockCardRenderer {
    calls: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
}

impl MockCardRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of render calls (profile and rank combined).
    pub fn render_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Makes subsequent renders fail with a render error.
    pub fn fail_renders(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    fn render(&self) -> Result<Vec<u8>, MediaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(MediaError::Render("scripted render failure".to_string()));
        }
        Ok(PLACEHOLDER_PNG.to_vec())
    }
}

#[async_trait]
impl CardRenderer for MockCardRenderer {
    async fn render_profile(
        &self,
        _subject: &CardSubject,
        _options: &CardOptions,
    ) -> Result<Vec<u8>, MediaError> {
        self.render()
    }

    async fn render_rank(
        &self,
        _subject: &CardSubject,
        _options: &CardOptions,
        _rank: &RankData,
    ) -> Result<Vec<u8>, MediaError> {
        self.render()
    }
}
