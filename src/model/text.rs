use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, Default, ToSchema)]
pub struct LowercaseRequestDto {
    /// The text to convert to lower case.
    pub text: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LowercaseResponseDto {
    pub text_output: String,
}

#[derive(Deserialize, Default, ToSchema)]
pub struct NumberCheckRequestDto {
    /// The text to inspect.
    pub text: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct NumberCheckResponseDto {
    pub input: String,
    /// Whether the trimmed input parses as a number.
    pub is_number: bool,
    /// Whether the input contains at least one digit.
    pub contains_number: bool,
}
