//! Inclusive time window used to filter buckets by creation and objects by
//! modification.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::domain::errors::ValidationError;

fn days_before(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    Duration::try_days(i64::from(days))
        .and_then(|age| now.checked_sub_signed(age))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Two-sided, independently optional, inclusive time filter.
///
/// Both bounds are normalized to UTC on assignment. With no bounds every
/// timestamp is in range; with only `start` the range is `[start, +inf)`;
/// with only `end` it is `(-inf, end]`; with both it is `[start, end]`.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use s3_finder::DateRange;
///
/// let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let end = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
/// let range = DateRange::between(start, end);
///
/// assert!(range.in_range(start));
/// assert!(range.in_range(end));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

impl DateRange {
    /// A range with no bounds
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn new<Tz: TimeZone>(start: Option<DateTime<Tz>>, end: Option<DateTime<Tz>>) -> Self {
        Self {
            start: start.map(|s| s.with_timezone(&Utc)),
            end: end.map(|e| e.with_timezone(&Utc)),
        }
    }

    pub fn between<Tz: TimeZone>(start: DateTime<Tz>, end: DateTime<Tz>) -> Self {
        Self::new(Some(start), Some(end))
    }

    /// Build a range from age limits in days relative to `now`.
    ///
    /// `min_age_days` excludes anything younger (sets `end`, only when > 0);
    /// `max_age_days` excludes anything older (sets `start`). Ages reaching
    /// past the earliest representable time clamp to it.
    pub fn from_age_days(
        min_age_days: Option<u32>,
        max_age_days: Option<u32>,
        now: DateTime<Utc>,
    ) -> Self {
        let end = min_age_days
            .filter(|days| *days > 0)
            .map(|days| days_before(now, days));
        let start = max_age_days.map(|days| days_before(now, days));
        Self { start, end }
    }

    /// Apply a lower bound, keeping whichever start is later
    pub fn tighten_start<Tz: TimeZone>(self, candidate: Option<DateTime<Tz>>) -> Self {
        let Some(candidate) = candidate.map(|c| c.with_timezone(&Utc)) else {
            return self;
        };
        let start = match self.start {
            Some(current) if current >= candidate => current,
            _ => candidate,
        };
        Self {
            start: Some(start),
            ..self
        }
    }

    /// Apply an upper bound, keeping whichever end is earlier
    pub fn tighten_end<Tz: TimeZone>(self, candidate: Option<DateTime<Tz>>) -> Self {
        let Some(candidate) = candidate.map(|c| c.with_timezone(&Utc)) else {
            return self;
        };
        let end = match self.end {
            Some(current) if current <= candidate => current,
            _ => candidate,
        };
        Self {
            end: Some(end),
            ..self
        }
    }

    pub fn in_range<Tz: TimeZone>(&self, timestamp: DateTime<Tz>) -> bool {
        let timestamp = timestamp.with_timezone(&Utc);
        self.start.map_or(true, |start| start <= timestamp)
            && self.end.map_or(true, |end| timestamp <= end)
    }

    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.start
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.end
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let start = self.start.map(|s| s.to_rfc3339());
        let end = self.end.map(|e| e.to_rfc3339());
        write!(
            f,
            "[{}, {}]",
            start.as_deref().unwrap_or("-inf"),
            end.as_deref().unwrap_or("+inf")
        )
    }
}

/// Parse a user supplied date as UTC.
///
/// Accepts RFC 3339 (`2024-01-15T10:30:00+02:00`), a naive date-time
/// (`2024-01-15T10:30:00` or `2024-01-15 10:30:00`) or a bare date
/// (`2024-01-15`, midnight). Naive inputs are taken to be UTC.
pub fn parse_utc_datetime(input: &str) -> Result<DateTime<Utc>, ValidationError> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ValidationError::InvalidDate {
            input: input.to_string(),
        })
}
