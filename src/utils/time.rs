use chrono::{Duration, NaiveTime, Timelike};

/// Parses a clock time typed by the user.
///
/// Accepts `H`, `HH`, `H:MM`, `HH:MM`, `H.MM` and `HHMM`. Anything outside
/// 00:00..=23:59 is rejected.
pub fn parse_time(input: &str) -> Option<NaiveTime> {
    let value = input.trim();
    if value.is_empty() {
        return None;
    }

    let (hours, minutes) = if let Some((h, m)) = value.split_once([':', '.']) {
        (h.trim(), m.trim())
    } else if value.len() == 4 && value.chars().all(|c| c.is_ascii_digit()) {
        value.split_at(2)
    } else {
        (value, "0")
    };

    if hours.is_empty() || hours.len() > 2 || minutes.is_empty() || minutes.len() > 2 {
        return None;
    }

    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    NaiveTime::from_hms_opt(hours, minutes, 0)
}

pub fn to_minutes(time: NaiveTime) -> i64 {
    time.hour() as i64 * 60 + time.minute() as i64
}

/// Adds minutes on the clock face; 23:50 + 30 is 00:20.
pub fn add_minutes(time: NaiveTime, delta: i64) -> NaiveTime {
    let (result, _) = time.overflowing_add_signed(Duration::minutes(delta));
    result
}

pub fn format_time(time: NaiveTime) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

/// Renders a minute count as `HH:MM`. Negative input renders as `00:00`.
pub fn format_duration(minutes: i64) -> String {
    let minutes = minutes.max(0);
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Minutes between two clock times, or 0 when `end` is not after `start`.
pub fn span_minutes(start: NaiveTime, end: NaiveTime) -> i64 {
    (to_minutes(end) - to_minutes(start)).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn parses_common_layouts() {
        assert_eq!(parse_time("09:00"), Some(t(9, 0)));
        assert_eq!(parse_time("9:5"), Some(t(9, 5)));
        assert_eq!(parse_time("0930"), Some(t(9, 30)));
        assert_eq!(parse_time("17"), Some(t(17, 0)));
        assert_eq!(parse_time(" 12.45 "), Some(t(12, 45)));
    }

    #[test]
    fn rejects_garbage_and_out_of_range() {
        assert_eq!(parse_time(""), None);
        assert_eq!(parse_time("abc"), None);
        assert_eq!(parse_time("24:00"), None);
        assert_eq!(parse_time("12:60"), None);
        assert_eq!(parse_time("123:00"), None);
    }

    #[test]
    fn converts_to_minutes() {
        assert_eq!(to_minutes(t(0, 0)), 0);
        assert_eq!(to_minutes(t(9, 0)), 540);
        assert_eq!(to_minutes(t(23, 59)), 1439);
    }

    #[test]
    fn adds_minutes_with_hour_rollover() {
        assert_eq!(add_minutes(t(12, 0), 30), t(12, 30));
        assert_eq!(add_minutes(t(12, 45), 30), t(13, 15));
        assert_eq!(add_minutes(t(9, 0), 8 * 60), t(17, 0));
    }

    #[test]
    fn wraps_past_midnight_without_a_date() {
        assert_eq!(add_minutes(t(23, 50), 30), t(0, 20));
    }

    #[test]
    fn formats_zero_padded() {
        assert_eq!(format_time(t(7, 5)), "07:05");
        assert_eq!(format_duration(480), "08:00");
        assert_eq!(format_duration(65), "01:05");
        assert_eq!(format_duration(-10), "00:00");
    }

    #[test]
    fn span_is_zero_for_reversed_times() {
        assert_eq!(span_minutes(t(9, 0), t(17, 0)), 480);
        assert_eq!(span_minutes(t(17, 0), t(9, 0)), 0);
        assert_eq!(span_minutes(t(9, 0), t(9, 0)), 0);
    }
}
