//! Bot-token extraction for the Discord-backed endpoints.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::server::error::{auth::AuthError, AppError};

/// Caller-supplied bot token from the `Authorization` header.
///
/// Accepts the token with or without the conventional `Bot ` prefix and
/// rejects requests without a usable token before the handler body runs, so
/// no external call is ever attempted unauthenticated.
pub struct BotToken(pub String);

impl<S> FromRequestParts<S> for BotToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(|raw| raw.strip_prefix("Bot ").unwrap_or(raw).trim())
            .unwrap_or("");

        if token.is_empty() {
            return Err(AuthError::MissingToken.into());
        }

        Ok(Self(token.to_string()))
    }
}
