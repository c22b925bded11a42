use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

/// Clock formats tried in order, 24-hour first.
const CLOCK_FORMATS: [&str; 5] = ["%H:%M:%S", "%H:%M", "%I:%M:%S %p", "%I:%M %p", "%I %p"];

/// Calendar date formats tried in order.
const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%m/%d/%y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
];

/// Date-time formats for deadlines that carry a clock but no zone.
const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Last-resort clock scan for phrases like "due by 11:59pm" or "7 pm".
static EMBEDDED_CLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,2})(?::(\d{2}))?\s*([ap])\.?m\.?|(\d{1,2}):(\d{2})")
        .expect("embedded clock pattern")
});

/// A parsed deadline that may or may not carry an explicit zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LooseDateTime {
    /// Carries an explicit UTC offset
    Zoned(DateTime<FixedOffset>),
    /// Wall clock with no zone attached
    Floating(NaiveDateTime),
}

/// Resolves a loose human time phrase into a time-of-day.
///
/// Unparseable input falls back to midnight rather than failing the whole
/// pipeline; the imprecise 00:00 anchor is left for downstream review.
pub fn parse_time(input: &str) -> NaiveTime {
    parse_time_opt(input).unwrap_or(NaiveTime::MIN)
}

fn parse_time_opt(input: &str) -> Option<NaiveTime> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    for format in CLOCK_FORMATS {
        if let Ok(time) = NaiveTime::parse_from_str(trimmed, format) {
            return Some(time);
        }
    }
    embedded_clock(trimmed)
}

fn embedded_clock(input: &str) -> Option<NaiveTime> {
    let captures = EMBEDDED_CLOCK.captures(input)?;
    if let Some(hour) = captures.get(1) {
        // 12-hour branch: meridiem present
        let hour: u32 = hour.as_str().parse().ok()?;
        let minute: u32 = captures
            .get(2)
            .map_or(Some(0), |m| m.as_str().parse().ok())?;
        let pm = captures
            .get(3)
            .is_some_and(|m| m.as_str().eq_ignore_ascii_case("p"));
        let hour = match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };
        NaiveTime::from_hms_opt(hour, minute, 0)
    } else {
        let hour: u32 = captures.get(4)?.as_str().parse().ok()?;
        let minute: u32 = captures.get(5)?.as_str().parse().ok()?;
        NaiveTime::from_hms_opt(hour, minute, 0)
    }
}

/// Resolves a loose calendar date, `None` when nothing matches.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

/// Resolves an absolute deadline: zoned date-time, naive date-time, or a
/// bare date anchored at midnight.
pub fn parse_date_time(input: &str) -> Option<LooseDateTime> {
    let trimmed = input.trim();
    if let Ok(zoned) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(LooseDateTime::Zoned(zoned));
    }
    if let Ok(zoned) = DateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S %z") {
        return Some(LooseDateTime::Zoned(zoned));
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(LooseDateTime::Floating(naive));
        }
    }
    parse_date(trimmed).map(|date| LooseDateTime::Floating(date.and_time(NaiveTime::MIN)))
}
