/*!
 * Millisecond Timestamps
 * Epoch-offset modification times decoupled from platform clock precision
 */

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch; negative for pre-epoch times
pub type Timestamp = i64;

/// Convert a system time to whole milliseconds since the epoch
///
/// Sub-millisecond precision is truncated.
pub fn from_system_time(time: SystemTime) -> Timestamp {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => after.as_millis() as i64,
        Err(e) => -(e.duration().as_millis() as i64),
    }
}

/// Convert whole milliseconds since the epoch back to a system time
pub fn to_system_time(millis: Timestamp) -> SystemTime {
    if millis >= 0 {
        UNIX_EPOCH + Duration::from_millis(millis as u64)
    } else {
        UNIX_EPOCH - Duration::from_millis(millis.unsigned_abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        for millis in [0i64, 1, 1_700_000_000_123, -1, -86_400_000] {
            assert_eq!(from_system_time(to_system_time(millis)), millis);
        }
    }

    #[test]
    fn test_truncates_submillisecond() {
        let time = UNIX_EPOCH + Duration::new(1, 999_999);
        assert_eq!(from_system_time(time), 1_000);
    }

    #[test]
    fn test_pre_epoch_is_negative() {
        let time = UNIX_EPOCH - Duration::from_millis(500);
        assert_eq!(from_system_time(time), -500);
        assert_eq!(to_system_time(-500), time);
    }
}
