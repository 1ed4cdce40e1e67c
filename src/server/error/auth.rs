use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::model::api::ErrorDto;

#[derive(Error, Debug)]
pub enum AuthError {
    /// No usable bot token in the `Authorization` header.
    ///
    /// Every Discord-backed endpoint authenticates with the caller-supplied
    /// bot token, so a missing or empty header fails before any external call
    /// is attempted. Results in a 401 Unauthorized response.
    #[error("Missing bot token in Authorization header")]
    MissingToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            Self::MissingToken => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorDto {
                    error: "Bot token is required".to_string(),
                }),
            )
                .into_response(),
        }
    }
}
