//! Discord snowflake decoding.
//!
//! A snowflake packs a millisecond timestamp (relative to the Discord
//! epoch), a worker id, a process id and a per-process increment into 64
//! bits. See <https://discord.com/developers/docs/reference#snowflakes>.

use chrono::{DateTime, Utc};

/// First second of 2015 in Unix milliseconds; the zero point of every
/// Discord snowflake timestamp.
pub const DISCORD_EPOCH_MS: i64 = 1_420_070_400_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSnowflake {
    pub timestamp_ms: i64,
    pub created_at: DateTime<Utc>,
    pub worker_id: u8,
    pub process_id: u8,
    pub increment: u16,
}

/// Decodes the fields of a snowflake.
pub fn decode(snowflake: u64) -> DecodedSnowflake {
    let timestamp_ms = (snowflake >> 22) as i64 + DISCORD_EPOCH_MS;

    DecodedSnowflake {
        timestamp_ms,
        created_at: DateTime::from_timestamp_millis(timestamp_ms)
            .unwrap_or(DateTime::UNIX_EPOCH),
        worker_id: ((snowflake & 0x3E0000) >> 17) as u8,
        process_id: ((snowflake & 0x1F000) >> 12) as u8,
        increment: (snowflake & 0xFFF) as u16,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests decoding the snowflake from Discord's reference documentation.
    ///
    /// Expected: 2016-04-30T11:18:25.796Z, worker 1, process 0, increment 7
    #[test]
    fn decodes_reference_snowflake() {
        let decoded = decode(175928847299117063);

        assert_eq!(decoded.timestamp_ms, 1_462_015_105_796);
        assert_eq!(
            decoded.created_at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            "2016-04-30T11:18:25.796Z"
        );
        assert_eq!(decoded.worker_id, 1);
        assert_eq!(decoded.process_id, 0);
        assert_eq!(decoded.increment, 7);
    }

    /// Tests that the all-zero snowflake maps to the Discord epoch itself.
    ///
    /// Expected: timestamp equals the Discord epoch, all fields zero
    #[test]
    fn decodes_zero_snowflake_to_epoch() {
        let decoded = decode(0);

        assert_eq!(decoded.timestamp_ms, DISCORD_EPOCH_MS);
        assert_eq!(decoded.worker_id, 0);
        assert_eq!(decoded.process_id, 0);
        assert_eq!(decoded.increment, 0);
    }
}
