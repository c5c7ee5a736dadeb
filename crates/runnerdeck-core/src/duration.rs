use chrono::Duration;

/// Formats an elapsed duration as `MM:SS`, growing to `HH:MM:SS` once it
/// reaches an hour. Hours never roll over into days. Negative durations
/// (clock skew, injected test times) keep their sign and are otherwise
/// formatted the same way.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.unsigned_abs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{sign}{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{sign}{minutes:02}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds_under_an_hour() {
        assert_eq!(format_duration(Duration::seconds(0)), "00:00");
        assert_eq!(format_duration(Duration::seconds(45)), "00:45");
        assert_eq!(format_duration(Duration::seconds(330)), "05:30");
        assert_eq!(format_duration(Duration::seconds(3599)), "59:59");
    }

    #[test]
    fn formats_hours_once_reached() {
        assert_eq!(format_duration(Duration::seconds(3600)), "01:00:00");
        assert_eq!(format_duration(Duration::seconds(8145)), "02:15:45");
    }

    #[test]
    fn hours_exceed_twenty_four_without_day_rollover() {
        assert_eq!(format_duration(Duration::seconds(91_800)), "25:30:00");
    }

    #[test]
    fn negative_durations_keep_their_sign() {
        assert_eq!(format_duration(Duration::seconds(-300)), "-05:00");
        assert_eq!(format_duration(Duration::seconds(-8145)), "-02:15:45");
    }
}
