//! Lightweight UTC date/time utilities (no chrono dependency).
//!
//! Uses Howard Hinnant's civil_from_days algorithm for Unix-to-date
//! conversion. Streak and monthly rollover math work on UTC civil days.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current UTC time as Unix seconds.
pub fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Current UTC timestamp in ISO-8601 format.
pub fn now_iso8601() -> String {
    unix_to_iso8601(now_unix_secs())
}

/// Convert Unix seconds to ISO-8601 UTC string.
pub fn unix_to_iso8601(secs: u64) -> String {
    let days = (secs / 86400) as i64;
    let time_of_day = secs % 86400;
    let hours = time_of_day / 3600;
    let minutes = (time_of_day % 3600) / 60;
    let seconds = time_of_day % 60;

    let (y, m, d) = civil_from_days(days);
    format!("{y:04}-{m:02}-{d:02}T{hours:02}:{minutes:02}:{seconds:02}Z")
}

/// UTC civil-day index for a Unix timestamp (days since 1970-01-01).
/// Two timestamps on the same UTC calendar day share an index; consecutive
/// days differ by exactly 1.
pub fn day_index(secs: u64) -> u64 {
    secs / 86400
}

/// UTC civil (year, month) for a Unix timestamp, for monthly rollover checks.
pub fn civil_month(secs: u64) -> (i64, u64) {
    let (y, m, _) = civil_from_days((secs / 86400) as i64);
    (y, m)
}

/// Howard Hinnant's civil_from_days: Unix epoch days → (year, month, day).
fn civil_from_days(days: i64) -> (i64, u64, u64) {
    let z = days + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u64;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y, m, d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_epoch() {
        assert_eq!(unix_to_iso8601(0), "1970-01-01T00:00:00Z");
    }

    #[test]
    fn test_known_date() {
        // 2026-02-21T00:00:00Z = 1771632000
        assert_eq!(unix_to_iso8601(1771632000), "2026-02-21T00:00:00Z");
    }

    #[test]
    fn test_now_is_recent() {
        let ts = now_iso8601();
        assert!(ts.starts_with("202"), "timestamp should be in 2020s: {ts}");
    }

    #[test]
    fn test_day_index_boundaries() {
        assert_eq!(day_index(0), 0);
        assert_eq!(day_index(86399), 0);
        assert_eq!(day_index(86400), 1);
        // Midnight and 23:59 of the same UTC day share an index
        assert_eq!(day_index(1771632000), day_index(1771632000 + 86399));
        assert_eq!(day_index(1771632000) + 1, day_index(1771632000 + 86400));
    }

    #[test]
    fn test_civil_month() {
        assert_eq!(civil_month(0), (1970, 1));
        // 2026-02-21
        assert_eq!(civil_month(1771632000), (2026, 2));
        // Jan 31 and Feb 1 of the same year land in different months
        let jan31 = 1769817600; // 2026-01-31T00:00:00Z
        assert_eq!(civil_month(jan31), (2026, 1));
        assert_eq!(civil_month(jan31 + 86400), (2026, 2));
    }
}
