use crate::server::error::{config::ConfigError, AppError};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_ARTIFACT_DIR: &str = "public";
const DEFAULT_CARD_FONT_PATH: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

pub struct Config {
    /// Public base URL, used to build artifact retrieval links.
    pub app_url: String,

    pub port: u16,

    /// Root directory for generated transcripts and card images.
    pub artifact_dir: String,

    /// TTF font used by the card renderer.
    pub card_font_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            app_url: std::env::var("APP_URL")
                .map_err(|_| ConfigError::MissingEnvVar("APP_URL".to_string()))?,
            port: optional_parsed("PORT", DEFAULT_PORT)?,
            artifact_dir: std::env::var("ARTIFACT_DIR")
                .unwrap_or_else(|_| DEFAULT_ARTIFACT_DIR.to_string()),
            card_font_path: std::env::var("CARD_FONT_PATH")
                .unwrap_or_else(|_| DEFAULT_CARD_FONT_PATH.to_string()),
        })
    }
}

fn optional_parsed<T: std::str::FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match std::env::var(name) {
        Ok(raw) => raw.parse().map_err(|_| {
            ConfigError::InvalidEnvVar {
                name: name.to_string(),
                value: raw,
            }
            .into()
        }),
        Err(_) => Ok(default),
    }
}
