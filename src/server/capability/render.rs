//! Card compositing backed by the `image` raster stack.
//!
//! Renders the profile and rank cards that used to come from an external
//! compositing library: flat or fetched background, two-tone border, round
//! avatar with presence dot, username lines, and for rank cards an XP bar
//! with level/rank labels. Text needs a TTF font; the path is configurable
//! and the font is loaded once, lazily.

use std::io::Cursor;
use std::path::PathBuf;

use ab_glyph::{FontArc, PxScale};
use async_trait::async_trait;
use capability::{CardOptions, CardRenderer, CardSubject, MediaError, RankData};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use tokio::sync::OnceCell;

const CARD_WIDTH: u32 = 885;
const CARD_HEIGHT: u32 = 303;
const AVATAR_SIZE: u32 = 160;
const BORDER_THICKNESS: u32 = 9;
const AVATAR_X: i64 = 48;
const AVATAR_Y: i64 = 72;

const BACKGROUND: Rgba<u8> = Rgba([0x23, 0x27, 0x2a, 0xff]);
const WHITE: Rgba<u8> = Rgba([0xf2, 0xf3, 0xf5, 0xff]);
const MUTED: Rgba<u8> = Rgba([0xb9, 0xbb, 0xbe, 0xff]);
const BAR_TRACK: Rgba<u8> = Rgba([0x48, 0x4b, 0x4e, 0xff]);

/// [`CardRenderer`] compositing cards in-process.
pub struct ImageCardRenderer {
    http: reqwest::Client,
    font_path: PathBuf,
    font: OnceCell<FontArc>,
}

impl ImageCardRenderer {
    pub fn new(http: reqwest::Client, font_path: impl Into<PathBuf>) -> Self {
        Self {
            http,
            font_path: font_path.into(),
            font: OnceCell::new(),
        }
    }

    async fn font(&self) -> Result<FontArc, MediaError> {
        let font = self
            .font
            .get_or_try_init(|| async {
                let bytes = tokio::fs::read(&self.font_path).await.map_err(|err| {
                    MediaError::Render(format!(
                        "failed to read card font {}: {}",
                        self.font_path.display(),
                        err
                    ))
                })?;
                FontArc::try_from_vec(bytes)
                    .map_err(|err| MediaError::Render(format!("failed to parse card font: {}", err)))
            })
            .await?;
        Ok(font.clone())
    }

    async fn fetch_image(&self, url: &str) -> Result<DynamicImage, MediaError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| MediaError::Render(format!("failed to fetch image {}: {}", url, err)))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|err| MediaError::Render(format!("failed to read image {}: {}", url, err)))?;

        image::load_from_memory(&bytes)
            .map_err(|err| MediaError::Render(format!("unsupported image data from {}: {}", url, err)))
    }

    /// Composites everything both card variants share.
    async fn compose_base(
        &self,
        subject: &CardSubject,
        options: &CardOptions,
    ) -> Result<RgbaImage, MediaError> {
        let mut base = match &options.custom_background {
            Some(url) => {
                let fetched = self
                    .fetch_image(url)
                    .await?
                    .resize_to_fill(CARD_WIDTH, CARD_HEIGHT, FilterType::Triangle)
                    .to_rgba8();
                let sigma = if options.more_background_blur { 12.0 } else { 3.0 };
                imageops::blur(&fetched, sigma)
            }
            None => RgbaImage::from_pixel(CARD_WIDTH, CARD_HEIGHT, BACKGROUND),
        };

        if let Some(percent) = options.background_brightness {
            let percent = percent.min(100) as i32;
            base = imageops::brighten(&base, (percent - 100) * 255 / 100);
        }

        if !options.remove_border {
            let top = parse_color(&options.border_color)?;
            let bottom = parse_color(&options.border_color_2)?;
            draw_border(&mut base, top, bottom);
        }

        if let Some(url) = &subject.avatar_url {
            let avatar = self
                .fetch_image(url)
                .await?
                .resize_to_fill(AVATAR_SIZE, AVATAR_SIZE, FilterType::Triangle)
                .to_rgba8();
            let avatar = if options.square_avatar {
                avatar
            } else {
                circle_mask(avatar)
            };
            imageops::overlay(&mut base, &avatar, AVATAR_X, AVATAR_Y);
        }

        if let Some(status) = &options.presence_status {
            let cx = (AVATAR_X + AVATAR_SIZE as i64 - 22) as i32;
            let cy = (AVATAR_Y + AVATAR_SIZE as i64 - 22) as i32;
            draw_filled_circle_mut(&mut base, (cx, cy), 18, BACKGROUND);
            draw_filled_circle_mut(&mut base, (cx, cy), 14, presence_color(status));
        }

        let font = self.font().await?;
        let username_color = optional_color(options.username_color.as_deref())?.unwrap_or(WHITE);
        draw_text_mut(
            &mut base,
            username_color,
            240,
            92,
            PxScale::from(44.0),
            &font,
            &subject.username,
        );

        let tag_color = optional_color(options.tag_color.as_deref())?.unwrap_or(MUTED);
        let tag = format!("@{}", subject.username.to_lowercase());
        draw_text_mut(&mut base, tag_color, 242, 144, PxScale::from(26.0), &font, &tag);

        if let Some(date) = &options.custom_date {
            draw_text_mut(&mut base, MUTED, 242, 252, PxScale::from(22.0), &font, date);
        }

        Ok(base)
    }

    fn encode_png(image: RgbaImage) -> Result<Vec<u8>, MediaError> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|err| MediaError::Render(format!("failed to encode PNG: {}", err)))?;
        Ok(bytes)
    }
}

fn parse_color(input: &str) -> Result<Rgba<u8>, MediaError> {
    crate::server::util::color::parse_hex_rgb(input)
        .map(|(r, g, b)| Rgba([r, g, b, 0xff]))
        .ok_or_else(|| MediaError::Render(format!("invalid hex color '{}'", input)))
}

fn optional_color(input: Option<&str>) -> Result<Option<Rgba<u8>>, MediaError> {
    input.map(parse_color).transpose()
}

/// Two-tone frame: top and upper sides in the first color, bottom and lower
/// sides in the second.
fn draw_border(base: &mut RgbaImage, top: Rgba<u8>, bottom: Rgba<u8>) {
    let half = CARD_HEIGHT / 2;
    draw_filled_rect_mut(base, Rect::at(0, 0).of_size(CARD_WIDTH, BORDER_THICKNESS), top);
    draw_filled_rect_mut(
        base,
        Rect::at(0, (CARD_HEIGHT - BORDER_THICKNESS) as i32).of_size(CARD_WIDTH, BORDER_THICKNESS),
        bottom,
    );
    for (x, color_top, color_bottom) in [
        (0, top, bottom),
        ((CARD_WIDTH - BORDER_THICKNESS) as i32, top, bottom),
    ] {
        draw_filled_rect_mut(base, Rect::at(x, 0).of_size(BORDER_THICKNESS, half), color_top);
        draw_filled_rect_mut(
            base,
            Rect::at(x, half as i32).of_size(BORDER_THICKNESS, CARD_HEIGHT - half),
            color_bottom,
        );
    }
}

/// Clears every pixel outside the inscribed circle.
fn circle_mask(mut avatar: RgbaImage) -> RgbaImage {
    let radius = avatar.width() as f32 / 2.0;
    for (x, y, pixel) in avatar.enumerate_pixels_mut() {
        let dx = x as f32 + 0.5 - radius;
        let dy = y as f32 + 0.5 - radius;
        if dx * dx + dy * dy > radius * radius {
            pixel[3] = 0;
        }
    }
    avatar
}

fn presence_color(status: &str) -> Rgba<u8> {
    match status {
        "online" => Rgba([0x3b, 0xa5, 0x5d, 0xff]),
        "idle" => Rgba([0xfa, 0xa8, 0x1a, 0xff]),
        "dnd" => Rgba([0xed, 0x42, 0x45, 0xff]),
        _ => Rgba([0x74, 0x7f, 0x8d, 0xff]),
    }
}

/// Width of the filled portion of the XP bar, clamped to the track.
fn bar_fill_width(current_xp: u64, required_xp: u64, track_width: u32) -> u32 {
    if required_xp == 0 {
        return track_width;
    }
    let ratio = (current_xp as f64 / required_xp as f64).clamp(0.0, 1.0);
    (ratio * track_width as f64).round() as u32
}

#[async_trait]
impl CardRenderer for ImageCardRenderer {
    async fn render_profile(
        &self,
        subject: &CardSubject,
        options: &CardOptions,
    ) -> Result<Vec<u8>, MediaError> {
        let base = self.compose_base(subject, options).await?;
        Self::encode_png(base)
    }

    async fn render_rank(
        &self,
        subject: &CardSubject,
        options: &CardOptions,
        rank: &RankData,
    ) -> Result<Vec<u8>, MediaError> {
        let mut base = self.compose_base(subject, options).await?;
        let font = self.font().await?;

        const BAR_X: i32 = 240;
        const BAR_Y: i32 = 210;
        const BAR_WIDTH: u32 = 560;
        const BAR_HEIGHT: u32 = 34;

        draw_filled_rect_mut(
            &mut base,
            Rect::at(BAR_X, BAR_Y).of_size(BAR_WIDTH, BAR_HEIGHT),
            BAR_TRACK,
        );
        let fill = bar_fill_width(rank.current_xp, rank.required_xp, BAR_WIDTH);
        if fill > 0 {
            draw_filled_rect_mut(
                &mut base,
                Rect::at(BAR_X, BAR_Y).of_size(fill, BAR_HEIGHT),
                parse_color(&rank.bar_color)?,
            );
        }

        let level_color = parse_color(&rank.level_color)?;
        draw_text_mut(
            &mut base,
            level_color,
            BAR_X,
            176,
            PxScale::from(26.0),
            &font,
            &format!("LVL {}", rank.level),
        );
        draw_text_mut(
            &mut base,
            WHITE,
            BAR_X + 130,
            176,
            PxScale::from(26.0),
            &font,
            &format!("RANK #{}", rank.rank),
        );
        draw_text_mut(
            &mut base,
            MUTED,
            BAR_X + 330,
            180,
            PxScale::from(22.0),
            &font,
            &format!("{} / {} XP", rank.current_xp, rank.required_xp),
        );

        Self::encode_png(base)
    }
}
