//! Server-side API backend.
//!
//! The backend bridges a small JSON HTTP surface into external collaborators:
//! the Discord platform (lookups, transcripts, embeds, presences), a voice
//! playback pipeline, and a card compositor. Axum is the web framework;
//! every external collaborator sits behind a trait from the `capability`
//! crate so handlers and services stay testable.
//!
//! # Architecture
//!
//! - **Controller Layer** (`controller/`) - HTTP request handlers, parameter
//!   validation and DTO conversion
//! - **Service Layer** (`service/`) - Business logic, including the playback
//!   session registry and sequencer
//! - **Capability Layer** (`capability/`) - Production implementations of the
//!   external collaborator traits (Serenity, Songbird, image stack)
//! - **Error Layer** (`error/`) - Application error types and HTTP response
//!   mapping
//! - **Middleware** (`middleware/`) - Bot-token extraction
//!
//! Supporting modules provide application infrastructure: `config`, `state`,
//! `startup`, `router`, `scheduler/` (transcript retention) and `util/`.
//!
//! # Request Flow
//!
//! 1. **Router** receives the HTTP request and routes to a controller
//! 2. **Middleware** extracts the caller's bot token where required
//! 3. **Controller** validates parameters and calls a service
//! 4. **Service** validates the payload, orchestrates capability calls
//! 5. **Capability** performs the external work and reports typed errors
//! 6. **Controller** converts the result to a DTO and returns the response

pub mod capability;
pub mod config;
pub mod controller;
pub mod error;
pub mod middleware;
pub mod router;
pub mod scheduler;
pub mod service;
pub mod startup;
pub mod state;
pub mod util;
