//! CF-style time units ("hours since 1970-01-01 00:00:00").

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ShapeCutError};

/// Step size of a time coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeStep {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeStep {
    fn seconds(&self) -> f64 {
        match self {
            Self::Seconds => 1.0,
            Self::Minutes => 60.0,
            Self::Hours => 3600.0,
            Self::Days => 86400.0,
        }
    }
}

/// Reference epoch plus step, Gregorian calendar only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeUnits {
    pub step: TimeStep,
    pub epoch: DateTime<Utc>,
}

impl TimeUnits {
    /// Parse a units string such as `"hours since 1970-01-01 00:00:00"`.
    pub fn parse(units: &str) -> Result<Self> {
        let invalid = || ShapeCutError::InvalidTimeUnits(units.to_string());

        let (step, epoch) = units.split_once(" since ").ok_or_else(invalid)?;

        let step = match step.trim().to_lowercase().as_str() {
            "second" | "seconds" | "s" => TimeStep::Seconds,
            "minute" | "minutes" => TimeStep::Minutes,
            "hour" | "hours" | "h" => TimeStep::Hours,
            "day" | "days" | "d" => TimeStep::Days,
            _ => return Err(invalid()),
        };

        let epoch = parse_epoch(epoch.trim()).ok_or_else(invalid)?;

        Ok(Self { step, epoch })
    }

    /// Convert a numeric time point into a UTC instant.
    ///
    /// Points that land outside chrono's representable range are invalid
    /// coordinates rather than a panic.
    pub fn to_datetime(&self, value: f64) -> Result<DateTime<Utc>> {
        let out_of_range = || {
            ShapeCutError::invalid_coordinate(
                "time",
                format!("time point {value} with units '{self}' is out of range"),
            )
        };

        let millis = (value * self.step.seconds() * 1000.0).round();
        if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
            return Err(out_of_range());
        }

        let delta = Duration::try_milliseconds(millis as i64).ok_or_else(out_of_range)?;
        self.epoch
            .checked_add_signed(delta)
            .ok_or_else(out_of_range)
    }

    /// Calendar year of a numeric time point.
    pub fn year_of(&self, value: f64) -> Result<i32> {
        Ok(self.to_datetime(value)?.year())
    }
}

impl std::fmt::Display for TimeStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Seconds => write!(f, "seconds"),
            Self::Minutes => write!(f, "minutes"),
            Self::Hours => write!(f, "hours"),
            Self::Days => write!(f, "days"),
        }
    }
}

impl std::fmt::Display for TimeUnits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} since {}",
            self.step,
            self.epoch.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

fn parse_epoch(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| Utc.from_utc_datetime(&ndt))
}
