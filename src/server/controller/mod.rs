//! HTTP request handlers.
//!
//! Controllers validate request parameters, convert DTOs, call into the
//! service layer and map results back to JSON responses. All error mapping
//! happens through `AppError`.

pub mod card;
pub mod embed;
pub mod playback;
pub mod presence;
pub mod snowflake;
pub mod text;
pub mod transcript;
