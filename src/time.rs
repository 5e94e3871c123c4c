use chrono::{DateTime, Datelike, Utc};

/// `strftime` pattern for everything after the year in `@timestamp`:
/// ISO-8601 with milliseconds and a literal `Z`.
pub const DATETIME_AFTER_YEAR: &str = "-%m-%dT%H:%M:%S%.3fZ";

/// Format epoch milliseconds as `yyyy-MM-ddTHH:mm:ss.SSSZ` in UTC.
///
/// The year is the year of era, zero-padded to at least four digits and
/// never signed. Instants outside the range `chrono` can represent are
/// clamped to its first or last representable millisecond.
pub fn format_timestamp(timestamp_millis: i64) -> String {
    let instant = DateTime::<Utc>::from_timestamp_millis(timestamp_millis).unwrap_or(
        if timestamp_millis < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        },
    );
    let (_, year) = instant.year_ce();
    format!("{:04}{}", year, instant.format(DATETIME_AFTER_YEAR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_start() {
        assert_eq!(format_timestamp(0), "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn keeps_millisecond_precision() {
        assert_eq!(format_timestamp(1_700_000_000_123), "2023-11-14T22:13:20.123Z");
    }

    #[test]
    fn before_epoch() {
        assert_eq!(format_timestamp(-1), "1969-12-31T23:59:59.999Z");
    }

    #[test]
    fn five_digit_year_has_no_sign() {
        assert_eq!(format_timestamp(253_402_300_800_000), "10000-01-01T00:00:00.000Z");
    }

    #[test]
    fn out_of_range_is_clamped() {
        assert_eq!(format_timestamp(i64::MAX), "262143-12-31T23:59:59.999Z");

        let earliest = format_timestamp(i64::MIN);
        assert!(earliest.ends_with("-01-01T00:00:00.000Z"), "{earliest}");
        assert!(earliest.as_bytes()[0].is_ascii_digit(), "{earliest}");
    }
}
