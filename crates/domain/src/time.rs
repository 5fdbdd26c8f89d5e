//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for timers and log entries.
pub type Timestamp = DateTime<Utc>;

/// Layout of the timestamp prefix written in front of every log line.
pub const LOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }

    #[test]
    fn should_format_with_second_precision() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(ts.format(LOG_TIME_FORMAT).to_string(), "2024-03-09 07:05:01");
    }
}
