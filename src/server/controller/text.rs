use axum::{
    extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse, Json,
};

use crate::{
    model::{
        api::ErrorDto,
        text::{
            LowercaseRequestDto, LowercaseResponseDto, NumberCheckRequestDto,
            NumberCheckResponseDto,
        },
    },
    server::{error::AppError, service::text},
};

/// Tag for grouping text endpoints in OpenAPI documentation
pub static TEXT_TAG: &str = "Text";

/// POST /lowercase - Convert all letters to lowercase
///
/// Converts everything sent in the `text` parameter to lowercase.
///
/// # Returns
/// - `200 OK`: The converted text
/// - `400 Bad Request`: Missing `text` parameter
#[utoipa::path(
    post,
    path = "/lowercase",
    tag = TEXT_TAG,
    request_body = LowercaseRequestDto,
    responses(
        (status = 200, description = "Successful request", body = LowercaseResponseDto),
        (status = 400, description = "Missing or invalid parameters", body = ErrorDto)
    ),
)]
pub async fn lowercase(
    payload: Result<Json<LowercaseRequestDto>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = payload.map(|Json(body)| body).unwrap_or_default();
    let Some(input) = body.text else {
        return Err(AppError::BadRequest(
            "Missing required parameter: text".to_string(),
        ));
    };

    Ok((
        StatusCode::OK,
        Json(LowercaseResponseDto {
            text_output: text::to_lowercase(&input),
        }),
    ))
}

/// POST /check-for-num - Numeric validation of a text value
///
/// Reports whether the supplied text parses as a number and whether it
/// contains any digit at all.
///
/// # Returns
/// - `200 OK`: Validation result
/// - `400 Bad Request`: Missing `text` parameter
#[utoipa::path(
    post,
    path = "/check-for-num",
    tag = TEXT_TAG,
    request_body = NumberCheckRequestDto,
    responses(
        (status = 200, description = "Successful request", body = NumberCheckResponseDto),
        (status = 400, description = "Missing or invalid parameters", body = ErrorDto)
    ),
)]
pub async fn check_for_num(
    payload: Result<Json<NumberCheckRequestDto>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = payload.map(|Json(body)| body).unwrap_or_default();
    let Some(input) = body.text else {
        return Err(AppError::BadRequest(
            "Missing required parameter: text".to_string(),
        ));
    };

    let response = NumberCheckResponseDto {
        is_number: text::is_number(&input),
        contains_number: text::contains_number(&input),
        input,
    };
    Ok((StatusCode::OK, Json(response)))
}
