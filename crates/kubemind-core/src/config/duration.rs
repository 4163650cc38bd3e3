//! Parsing of configured durations.

use std::time::Duration;

/// Parse a positive duration.
///
/// Accepted forms:
/// - `HH:MM:SS`, optionally `D.HH:MM:SS`, seconds may be fractional
/// - plain seconds, e.g. `300`
/// - a number with a unit suffix: `ms`, `s`, `m`, `h`, `d`
///
/// Returns `None` for anything else and for a zero duration.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let duration = if raw.contains(':') {
        parse_clock(raw)?
    } else {
        parse_with_unit(raw)?
    };

    (!duration.is_zero()).then_some(duration)
}

fn parse_clock(raw: &str) -> Option<Duration> {
    let parts: Vec<&str> = raw.split(':').collect();
    let [head, minutes, seconds] = parts.as_slice() else {
        return None;
    };

    let (days, hours) = match head.split_once('.') {
        Some((days, hours)) => (days.parse::<u64>().ok()?, hours.parse::<u64>().ok()?),
        None => (0, head.parse::<u64>().ok()?),
    };
    let minutes = minutes.parse::<u64>().ok()?;
    let seconds = seconds.parse::<f64>().ok()?;

    if hours >= 24 && days > 0 || minutes >= 60 || !(0.0..60.0).contains(&seconds) {
        return None;
    }

    let whole = days
        .checked_mul(86_400)?
        .checked_add(hours.checked_mul(3_600)?)?
        .checked_add(minutes * 60)?;
    Duration::from_secs(whole).checked_add(Duration::try_from_secs_f64(seconds).ok()?)
}

fn parse_with_unit(raw: &str) -> Option<Duration> {
    let split = raw
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(raw.len());
    let (number, unit) = raw.split_at(split);
    let value = number.parse::<f64>().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }

    let seconds = match unit.trim() {
        "" | "s" => value,
        "ms" => value / 1_000.0,
        "m" => value * 60.0,
        "h" => value * 3_600.0,
        "d" => value * 86_400.0,
        _ => return None,
    };
    Duration::try_from_secs_f64(seconds).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_format() {
        assert_eq!(parse_duration("00:05:00"), Some(Duration::from_secs(300)));
        assert_eq!(parse_duration("01:00:30"), Some(Duration::from_secs(3630)));
        assert_eq!(
            parse_duration("1.02:00:00"),
            Some(Duration::from_secs(26 * 3600))
        );
        assert_eq!(
            parse_duration("00:00:01.5"),
            Some(Duration::from_millis(1500))
        );
    }

    #[test]
    fn test_unit_suffixes() {
        assert_eq!(parse_duration("300"), Some(Duration::from_secs(300)));
        assert_eq!(parse_duration("45s"), Some(Duration::from_secs(45)));
        assert_eq!(parse_duration("5m"), Some(Duration::from_secs(300)));
        assert_eq!(parse_duration("2h"), Some(Duration::from_secs(7200)));
        assert_eq!(parse_duration("250ms"), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_rejects_garbage_and_zero() {
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("soon"), None);
        assert_eq!(parse_duration("5 fortnights"), None);
        assert_eq!(parse_duration("00:61:00"), None);
        assert_eq!(parse_duration("1:2"), None);
        assert_eq!(parse_duration("0"), None);
        assert_eq!(parse_duration("00:00:00"), None);
        assert_eq!(parse_duration("-5"), None);
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert_eq!(parse_duration("99999999999999999999"), None);
        assert_eq!(parse_duration("1e400"), None);
        assert_eq!(parse_duration("99999999999999999999d"), None);
        assert_eq!(parse_duration("9999999999999999999:00:00"), None);
        assert_eq!(parse_duration("999999999999999999.00:00:00"), None);
    }
}
