// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Timestamps stored on records.
//!
//! Records keep timestamps as RFC3339 strings with a `Z` suffix and second
//! precision, so lexical order matches chronological order. History queries
//! sort on these strings.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Current time as a record timestamp.
pub fn now_rfc3339() -> String {
    format_utc_rfc3339(Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_uses_z_suffix() {
        let date = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        assert_eq!(format_utc_rfc3339(date), "2024-01-15T10:00:00Z");
    }

    #[test]
    fn test_lexical_order_is_chronological() {
        let earlier = format_utc_rfc3339(Utc.with_ymd_and_hms(2024, 9, 30, 23, 59, 59).unwrap());
        let later = format_utc_rfc3339(Utc.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).unwrap());
        assert!(earlier < later);
    }
}
