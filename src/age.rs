//! Human-relative age labels for feed items.
//!
//! Labels are coarse on purpose: anything under a minute old is "1 minute",
//! and anything older than a day, or in the future, is rendered as a calendar date.

use chrono::{DateTime, Duration, FixedOffset, Local, Utc};
use chrono_tz::Tz;

use crate::app::{NuztapError, Result};

/// Timestamp layout used by the upstream provider, e.g.
/// `Wed Dec 20 09:00:00 +0000 2023`.
pub const PROVIDER_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

const DATE_FORMAT: &str = "%b %-d, %Y";

/// Time zone used for the absolute-date branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayZone {
    #[default]
    Local,
    Named(Tz),
}

impl DisplayZone {
    /// Resolve an optional IANA zone name. `None` means the system zone.
    pub fn from_name(name: Option<&str>) -> Result<Self> {
        match name {
            None => Ok(Self::Local),
            Some(name) => name
                .parse::<Tz>()
                .map(Self::Named)
                .map_err(|e| NuztapError::Config(format!("Unknown timezone {}: {}", name, e))),
        }
    }
}

/// Parse a raw item timestamp. Both accepted layouts carry an explicit offset.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>> {
    let raw = raw.trim();
    DateTime::parse_from_str(raw, PROVIDER_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map_err(|_| NuztapError::MalformedTimestamp(raw.to_string()))
}

#[derive(Debug, Clone, Default)]
pub struct TimeBucketer {
    zone: DisplayZone,
}

impl TimeBucketer {
    pub fn new(zone: DisplayZone) -> Self {
        Self { zone }
    }

    /// Classify a raw timestamp relative to `now`.
    pub fn classify(&self, now: DateTime<Utc>, past: &str) -> Result<String> {
        let past = parse_timestamp(past)?.with_timezone(&Utc);
        Ok(self.classify_time(now, past))
    }

    /// Thresholds are checked in order and the first match wins. A `past`
    /// later than `now` fails every threshold and is rendered as a date.
    pub fn classify_time(&self, now: DateTime<Utc>, past: DateTime<Utc>) -> String {
        let elapsed = now.signed_duration_since(past);
        let minutes = (elapsed.num_milliseconds() as f64 / 60_000.0).round() as i64;

        if past > now {
            self.format_date(past)
        } else if past > now - Duration::seconds(60) {
            "1 minute".to_string()
        } else if past > now - Duration::seconds(60 * 60) {
            format!("{} minutes", minutes)
        } else if past > now - Duration::seconds(24 * 60 * 60) {
            format!("{} hours", minutes / 60)
        } else {
            self.format_date(past)
        }
    }

    fn format_date(&self, past: DateTime<Utc>) -> String {
        match self.zone {
            DisplayZone::Local => past.with_timezone(&Local).format(DATE_FORMAT).to_string(),
            DisplayZone::Named(tz) => past.with_timezone(&tz).format(DATE_FORMAT).to_string(),
        }
    }
}
