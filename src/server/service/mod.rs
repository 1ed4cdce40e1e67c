pub mod artifact;
pub mod card;
pub mod embed;
pub mod playback;
pub mod presence;
pub mod snowflake;
pub mod text;
pub mod transcript;
