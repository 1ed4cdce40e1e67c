//! Error types and HTTP response handling.
//!
//! `AppError` is the top-level error type returned by every controller. It
//! wraps the capability error kinds and the playback session errors and
//! implements `IntoResponse`, so handlers can use `?` throughout and the
//! mapping to status codes lives in one place. Upstream and media failures
//! are logged with full detail but reach the caller as generic messages.

pub mod auth;
pub mod config;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use capability::{MediaError, UpstreamError};
use thiserror::Error;

use crate::{
    model::api::ErrorDto,
    server::{
        error::{auth::AuthError, config::ConfigError},
        service::playback::SessionError,
    },
};

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error during startup or environment variable loading.
    #[error(transparent)]
    ConfigErr(#[from] ConfigError),

    /// Missing or unusable bot-token credential. Delegates to
    /// `AuthError::into_response()` for its 401 mapping.
    #[error(transparent)]
    AuthErr(#[from] AuthError),

    /// The Discord platform rejected a call or the referenced object is
    /// absent. Absence maps to 404; everything else to a generic 500.
    #[error(transparent)]
    UpstreamErr(#[from] UpstreamError),

    /// Voice or rendering pipeline failure. Always a generic 500; the
    /// underlying cause is logged for operators only.
    #[error(transparent)]
    MediaErr(#[from] MediaError),

    /// Playback session registry error (unknown session, duplicate guild).
    #[error(transparent)]
    SessionErr(#[from] SessionError),

    /// Artifact filesystem error.
    #[error(transparent)]
    IoErr(#[from] std::io::Error),

    /// Cron scheduler error.
    #[error(transparent)]
    SchedulerErr(#[from] tokio_cron_scheduler::JobSchedulerError),

    /// Resource not found. Results in 404 with the provided message.
    #[error("{0}")]
    NotFound(String),

    /// Invalid request. Results in 400 with the provided message, naming the
    /// first missing or malformed field.
    #[error("{0}")]
    BadRequest(String),

    /// Internal server error with custom message. The message is logged but a
    /// generic message is returned to the client.
    #[error("{0}")]
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::AuthErr(err) => err.into_response(),
            Self::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(ErrorDto { error: msg })).into_response()
            }
            Self::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(ErrorDto { error: msg })).into_response()
            }
            Self::UpstreamErr(UpstreamError::NotFound { kind, id }) => (
                StatusCode::NOT_FOUND,
                Json(ErrorDto {
                    error: format!("{} {} not found", kind, id),
                }),
            )
                .into_response(),
            Self::SessionErr(err) => err.into_response(),
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorDto {
                        error: "Internal server error".to_string(),
                    }),
                )
                    .into_response()
            }
            err => InternalServerError(err).into_response(),
        }
    }
}

/// Wrapper type for converting any displayable error into a 500 response.
///
/// Logs the full error message and returns a generic body, so upstream and
/// pipeline detail never leaks to the caller.
pub struct InternalServerError<E>(pub E);

impl<E: std::fmt::Display> IntoResponse for InternalServerError<E> {
    fn into_response(self) -> Response {
        tracing::error!("{}", self.0);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorDto {
                error: "Internal server error".to_string(),
            }),
        )
            .into_response()
    }
}
