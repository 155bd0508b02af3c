//! Date/time fragment accumulation for `dt-*` properties.
//!
//! The value-class pattern lets authors scatter a date, a time and a
//! timezone across sibling elements. [`Datetime`] collects those
//! fragments: the first fragment to supply each component wins, and the
//! canonical string renders exactly the components that were set.

#![allow(clippy::expect_used)]

use std::fmt;
use std::sync::LazyLock;

use chrono::{FixedOffset, NaiveDate, NaiveTime};
use regex::{Captures, Regex};

use crate::result::{Microformat, PropertyValue};

const DATE_PATTERN: &str =
    r"(?P<year>\d{4})-(?:(?P<month>\d{2})-(?P<day>\d{2})|(?P<yearday>\d{3}))";
const TIME_PATTERN: &str =
    r"(?P<hour>\d{1,2})(?::(?P<minute>\d{2})(?::(?P<second>\d{2}))?)?\s*(?P<ampm>[ap]\.?m\.?)?";
const TZ_PATTERN: &str = r"(?:(?P<zulu>Z)|(?P<tzsign>[+-])(?P<tzhour>\d{1,2}):?(?P<tzminute>\d{2})?)";

static DATETIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "(?i)^{DATE_PATTERN}[T ]{TIME_PATTERN}(?:{TZ_PATTERN})?$"
    ))
    .expect("DATETIME_RE regex")
});

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("(?i)^{DATE_PATTERN}$")).expect("DATE_RE regex"));

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("(?i)^{TIME_PATTERN}(?:{TZ_PATTERN})?$")).expect("TIME_RE regex")
});

static TZ_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("(?i)^{TZ_PATTERN}$")).expect("TZ_RE regex"));

/// Accumulator for date/time fragments. Each component (date, time,
/// seconds precision, timezone) is set at most once; later fragments of
/// the same kind are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Datetime {
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    has_seconds: bool,
    tz: Option<FixedOffset>,
}

impl Datetime {
    /// Feed one fragment into the accumulator. Fragments may be a full
    /// datetime (`T` or space separated), a date (`YYYY-MM-DD` or ordinal
    /// `YYYY-DDD`), a time (24h or am/pm, optional seconds, optional
    /// offset), or a bare timezone (`Z`, `±HH:MM`, `±HHMM`, `±HH`).
    /// Fragments that match no accepted form are discarded.
    pub fn parse(&mut self, s: &str) {
        let s = s.trim();
        if let Some(caps) = DATETIME_RE.captures(s) {
            self.apply_date(&caps);
            self.apply_time(&caps);
            self.apply_tz(&caps);
        } else if let Some(caps) = DATE_RE.captures(s) {
            self.apply_date(&caps);
        } else if let Some(caps) = TIME_RE.captures(s) {
            self.apply_time(&caps);
            self.apply_tz(&caps);
        } else if let Some(caps) = TZ_RE.captures(s) {
            self.apply_tz(&caps);
        }
    }

    /// Set the date component unless one is already present.
    pub fn set_date(&mut self, date: NaiveDate) {
        if self.date.is_none() {
            self.date = Some(date);
        }
    }

    fn set_time(&mut self, time: NaiveTime, has_seconds: bool) {
        if self.time.is_none() {
            self.time = Some(time);
            self.has_seconds = has_seconds;
        }
    }

    fn set_tz(&mut self, tz: FixedOffset) {
        if self.tz.is_none() {
            self.tz = Some(tz);
        }
    }

    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    #[must_use]
    pub fn has_date(&self) -> bool {
        self.date.is_some()
    }

    #[must_use]
    pub fn has_time(&self) -> bool {
        self.time.is_some()
    }

    fn apply_date(&mut self, caps: &Captures) {
        let Some(year) = int(caps, "year").and_then(|y| i32::try_from(y).ok()) else {
            return;
        };
        let date = if let Some(yearday) = int(caps, "yearday") {
            NaiveDate::from_yo_opt(year, u32::try_from(yearday).unwrap_or(0))
        } else {
            match (int(caps, "month"), int(caps, "day")) {
                (Some(m), Some(d)) => NaiveDate::from_ymd_opt(
                    year,
                    u32::try_from(m).unwrap_or(0),
                    u32::try_from(d).unwrap_or(0),
                ),
                _ => None,
            }
        };
        if let Some(date) = date {
            self.set_date(date);
        }
    }

    fn apply_time(&mut self, caps: &Captures) {
        let Some(mut hour) = int(caps, "hour") else {
            return;
        };
        if let Some(ampm) = caps.name("ampm") {
            let pm = ampm.as_str().to_ascii_lowercase().starts_with('p');
            if pm && hour < 12 {
                hour += 12;
            } else if !pm && hour == 12 {
                hour = 0;
            }
        }
        let minute = int(caps, "minute").unwrap_or(0);
        let second = int(caps, "second");
        let time = NaiveTime::from_hms_opt(
            u32::try_from(hour).unwrap_or(0),
            u32::try_from(minute).unwrap_or(0),
            u32::try_from(second.unwrap_or(0)).unwrap_or(0),
        );
        if let Some(time) = time {
            self.set_time(time, second.is_some());
        }
    }

    fn apply_tz(&mut self, caps: &Captures) {
        if caps.name("zulu").is_some() {
            if let Some(utc) = FixedOffset::east_opt(0) {
                self.set_tz(utc);
            }
            return;
        }
        let (Some(sign), Some(hour)) = (caps.name("tzsign"), int(caps, "tzhour")) else {
            return;
        };
        let minute = int(caps, "tzminute").unwrap_or(0);
        let mut seconds = i32::try_from(hour * 3600 + minute * 60).unwrap_or(0);
        if sign.as_str() == "-" {
            seconds = -seconds;
        }
        if let Some(offset) = FixedOffset::east_opt(seconds) {
            self.set_tz(offset);
        }
    }
}

/// Canonical rendering: `YYYY-MM-DD` plus ` HH:MM`, `:SS` and the
/// timezone (`Z` or `±HHMM`) for the components that were set. Empty when
/// no date was ever set; the timezone prints only alongside a time.
impl fmt::Display for Datetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(date) = self.date else {
            return Ok(());
        };
        write!(f, "{}", date.format("%Y-%m-%d"))?;
        if let Some(time) = self.time {
            write!(f, " {}", time.format("%H:%M"))?;
            if self.has_seconds {
                write!(f, ":{}", time.format("%S"))?;
            }
            if let Some(tz) = self.tz {
                let secs = tz.local_minus_utc();
                if secs == 0 {
                    write!(f, "Z")?;
                } else {
                    let sign = if secs < 0 { '-' } else { '+' };
                    let abs = secs.abs();
                    write!(f, "{sign}{:02}{:02}", abs / 3600, (abs % 3600) / 60)?;
                }
            }
        }
        Ok(())
    }
}

fn int(caps: &Captures, name: &str) -> Option<i64> {
    caps.name(name).and_then(|m| m.as_str().parse().ok())
}

/// Impute dates onto time-only `end` values from the first dated `start`
/// value. Runs once per item, after all descendants have been walked.
pub(crate) fn imply_end_date(item: &mut Microformat) {
    if !item.properties.contains_key("end") {
        return;
    }
    let start_date = item.properties.get("start").and_then(|values| {
        values.iter().find_map(|v| {
            let mut d = Datetime::default();
            d.parse(v.as_plain()?);
            d.date()
        })
    });
    let Some(start_date) = start_date else {
        return;
    };
    if let Some(ends) = item.properties.get_mut("end") {
        for value in ends {
            if let PropertyValue::Plain(s) = value {
                let mut d = Datetime::default();
                d.parse(s);
                if d.has_time() && !d.has_date() {
                    d.set_date(start_date);
                    *s = d.to_string();
                }
            }
        }
    }
}
