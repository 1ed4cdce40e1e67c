//! Botbridge Test Utils
//!
//! Shared testing doubles for the botbridge service. Every external
//! collaborator trait from the `capability` crate has a mock here that
//! records calls, serves scripted fixtures, and can be told to fail, so
//! service- and sequencer-level tests run without touching Discord, a voice
//! gateway, or the image pipeline.
//!
//! # Overview
//!
//! - **MockDiscordApi**: fixture-backed Discord platform with per-operation
//!   call counts and a log of sent embeds
//! - **MockVoiceConnector**: hands out probes that record played tracks and
//!   let a test fire completion events manually
//! - **MockCardRenderer**: counts renders and returns placeholder PNG bytes
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::mock::MockDiscordApi;
//!
//! let discord = MockDiscordApi::new().with_guild(1, "Test Guild");
//! // hand an Arc of it to the service under test, then:
//! assert_eq!(discord.counts().fetch_members, 1);
//! ```

pub mod mock;
