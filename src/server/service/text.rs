//! Text transformations for the stateless text endpoints.

/// Converts the input to lowercase, Unicode-aware.
pub fn to_lowercase(text: &str) -> String {
    text.to_lowercase()
}

/// Whether the trimmed input parses as a number (integer or float).
pub fn is_number(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && trimmed.parse::<f64>().is_ok()
}

/// Whether the input contains at least one ASCII digit.
pub fn contains_number(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
}
