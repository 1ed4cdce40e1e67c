use crate::server::error::AppError;

/// Parses a Discord snowflake id supplied by the caller.
///
/// # Arguments
/// - `name` - Parameter name for the error message
/// - `value` - The raw string to parse into `u64`
///
/// # Returns
/// - `Ok(u64)` - Successfully parsed id
/// - `Err(AppError::BadRequest)` - Value is not a valid id; the message
///   names the offending parameter
pub fn parse_discord_id(name: &str, value: &str) -> Result<u64, AppError> {
    // Snowflakes are non-zero; the SDK id types reject 0 outright.
    match value.trim().parse::<u64>() {
        Ok(id) if id != 0 => Ok(id),
        _ => Err(AppError::BadRequest(format!(
            "Invalid value for parameter: {}",
            name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests parsing valid and invalid snowflake strings.
    ///
    /// Expected: Ok for digits, Err naming the parameter otherwise
    #[test]
    fn parses_snowflake_strings() {
        assert_eq!(parse_discord_id("serverid", "1175149604845666304").unwrap(), 1175149604845666304);
        assert_eq!(parse_discord_id("vcid", " 42 ").unwrap(), 42);

        let err = parse_discord_id("serverid", "not-a-number").unwrap_err();
        assert!(err.to_string().contains("serverid"));

        assert!(parse_discord_id("vcid", "-1").is_err());
        assert!(parse_discord_id("vcid", "0").is_err());
        assert!(parse_discord_id("vcid", "").is_err());
    }
}
