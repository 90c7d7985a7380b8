//! The time interval a booking occupies on a unit.
//!
//! All windows are expressed in the marketplace's local time. Hourly windows
//! start at a time of day and last a number of minutes; daily windows cover
//! whole calendar days starting at midnight.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine, UnitKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Window {
    Hourly {
        date: NaiveDate,
        start: NaiveTime,
        minutes: i64,
    },
    Daily {
        date: NaiveDate,
        days: i64,
    },
}

impl Window {
    #[must_use]
    pub fn hourly(date: NaiveDate, start: NaiveTime, minutes: i64) -> Self {
        Self::Hourly {
            date,
            start,
            minutes,
        }
    }

    #[must_use]
    pub fn daily(date: NaiveDate, days: i64) -> Self {
        Self::Daily { date, days }
    }

    #[must_use]
    pub fn kind(&self) -> UnitKind {
        match self {
            Self::Hourly { .. } => UnitKind::Board,
            Self::Daily { .. } => UnitKind::Daily,
        }
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::Hourly { date, .. } | Self::Daily { date, .. } => *date,
        }
    }

    #[must_use]
    pub fn start_time(&self) -> Option<NaiveTime> {
        match self {
            Self::Hourly { start, .. } => Some(*start),
            Self::Daily { .. } => None,
        }
    }

    /// Minutes for hourly windows, days for daily ones.
    #[must_use]
    pub fn duration(&self) -> i64 {
        match self {
            Self::Hourly { minutes, .. } => *minutes,
            Self::Daily { days, .. } => *days,
        }
    }

    /// Start hour used by the time-of-day pricing rules.
    #[must_use]
    pub fn start_hour(&self) -> u32 {
        self.start_time().map_or(0, |t| t.hour())
    }

    /// Half-open `[start, end)` bounds.
    pub fn bounds(&self) -> ResultEngine<(NaiveDateTime, NaiveDateTime)> {
        if self.duration() <= 0 {
            return Err(EngineError::InvalidAmount(
                "duration must be > 0".to_string(),
            ));
        }
        let (start, length) = match self {
            Self::Hourly {
                date,
                start,
                minutes,
            } => (date.and_time(*start), Duration::try_minutes(*minutes)),
            Self::Daily { date, days } => (
                date.and_time(NaiveTime::MIN),
                Duration::try_days(*days),
            ),
        };
        let end = length
            .and_then(|len| start.checked_add_signed(len))
            .ok_or_else(|| EngineError::InvalidAmount("duration too large".to_string()))?;
        Ok((start, end))
    }

    /// Checks an hourly window against `[open_hour, close_hour]` on its own date.
    ///
    /// Daily windows have no operating hours.
    pub fn ensure_within_hours(&self, open_hour: u32, close_hour: u32) -> ResultEngine<()> {
        let Self::Hourly { date, .. } = self else {
            return Ok(());
        };
        let (start, end) = self.bounds()?;
        let open = NaiveTime::from_hms_opt(open_hour, 0, 0)
            .map(|t| date.and_time(t))
            .ok_or_else(|| EngineError::OutsideHours(format!("invalid opening hour {open_hour}")))?;
        let close = if close_hour >= 24 {
            date.succ_opt().map(|d| d.and_time(NaiveTime::MIN))
        } else {
            NaiveTime::from_hms_opt(close_hour, 0, 0).map(|t| date.and_time(t))
        }
        .ok_or_else(|| EngineError::OutsideHours(format!("invalid closing hour {close_hour}")))?;

        if start < open || end > close {
            return Err(EngineError::OutsideHours(format!(
                "window {} to {} is outside {open_hour:02}:00 to {close_hour:02}:00",
                start.format("%H:%M"),
                end.format("%H:%M")
            )));
        }
        Ok(())
    }
}
