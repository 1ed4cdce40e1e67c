//! Card compositing capability.

use async_trait::async_trait;

use crate::error::MediaError;

/// The user a card is rendered for, resolved ahead of rendering.
#[derive(Debug, Clone)]
pub struct CardSubject {
    pub user_id: u64,
    pub username: String,
    pub avatar_url: Option<String>,
}

/// Compositing options shared by the profile and rank cards.
///
/// The two border colors are the only required inputs; everything else keeps
/// the renderer's defaults when absent.
#[derive(Debug, Clone)]
pub struct CardOptions {
    /// Two-tone border, top-to-bottom.
    pub border_color: String,
    pub border_color_2: String,
    pub username_color: Option<String>,
    pub tag_color: Option<String>,
    /// Presence dot next to the avatar ("online", "idle", "dnd", "offline").
    pub presence_status: Option<String>,
    /// URL of a background image to fetch instead of the flat fill.
    pub custom_background: Option<String>,
    /// Background brightness in percent, 0–100.
    pub background_brightness: Option<u8>,
    pub more_background_blur: bool,
    pub square_avatar: bool,
    pub remove_border: bool,
    /// Free-form date line under the username.
    pub custom_date: Option<String>,
}

/// Extra inputs for the rank card variant.
#[derive(Debug, Clone)]
pub struct RankData {
    pub current_xp: u64,
    pub required_xp: u64,
    pub level: u32,
    pub rank: u32,
    pub bar_color: String,
    pub level_color: String,
}

/// Composites card images to PNG bytes.
#[async_trait]
pub trait CardRenderer: Send + Sync {
    async fn render_profile(
        &self,
        subject: &CardSubject,
        options: &CardOptions,
    ) -> Result<Vec<u8>, MediaError>;

    async fn render_rank(
        &self,
        subject: &CardSubject,
        options: &CardOptions,
        rank: &RankData,
    ) -> Result<Vec<u8>, MediaError>;
}
