//! Production implementations of the external capability traits.
//!
//! Everything that actually talks to Discord, the voice gateway or the image
//! pipeline lives here; the rest of the server only sees the traits from the
//! `capability` crate.

pub mod discord;
pub mod render;
pub mod voice;

pub use discord::SerenityDiscord;
pub use render::ImageCardRenderer;
pub use voice::SongbirdConnector;
