//! Request and response DTOs for the HTTP surface.
//!
//! Field names follow the wire format the service has always spoken
//! (`text_output`, `imageUrl`, `borderColor_2`, ...), so serde renames are
//! applied per-DTO rather than forcing one convention over the whole API.

pub mod api;
pub mod card;
pub mod embed;
pub mod playback;
pub mod presence;
pub mod snowflake;
pub mod text;
pub mod transcript;
