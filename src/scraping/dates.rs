use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone,
};
use chrono_tz::Tz;
use thiserror::Error;

/// Events without an end marker are assumed to last this long.
pub const DEFAULT_DURATION_SECS: i64 = 3600;

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%dT%H:%M%z"];
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateParseError {
    #[error("no timestamp in {0:?}")]
    Missing(String),
    #[error("unparseable timestamp {0:?}")]
    Invalid(String),
    #[error("timestamp {0:?} does not exist in the configured timezone")]
    NonexistentLocalTime(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

pub struct DateNormalizer {
    timezone: Tz,
}

impl DateNormalizer {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    /// Parses `"<start> [<separator> <end>]"`. Only the first and third
    /// tokens are read; anything shorter than three tokens gets the default
    /// duration.
    pub fn normalize(&self, raw: &str) -> Result<TimeRange, DateParseError> {
        let tokens: Vec<&str> = raw.split_whitespace().collect();
        let first = tokens
            .first()
            .ok_or_else(|| DateParseError::Missing(raw.to_string()))?;
        let start = self.parse_timestamp(first)?;
        let end = match tokens.get(2) {
            Some(token) => self.parse_timestamp(token)?,
            None => start + Duration::seconds(DEFAULT_DURATION_SECS),
        };
        Ok(TimeRange { start, end })
    }

    pub fn parse_timestamp(&self, token: &str) -> Result<DateTime<FixedOffset>, DateParseError> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(token) {
            return Ok(dt);
        }
        for fmt in OFFSET_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(token, fmt) {
                return Ok(dt);
            }
        }

        let naive = NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(token, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(token, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
            .ok_or_else(|| DateParseError::Invalid(token.to_string()))?;
        self.localize(naive, token)
    }

    fn localize(
        &self,
        naive: NaiveDateTime,
        token: &str,
    ) -> Result<DateTime<FixedOffset>, DateParseError> {
        let local = match self.timezone.from_local_datetime(&naive) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(dt, _) => dt,
            LocalResult::None => {
                return Err(DateParseError::NonexistentLocalTime(token.to_string()))
            }
        };
        Ok(local.with_timezone(&local.offset().fix()))
    }
}
