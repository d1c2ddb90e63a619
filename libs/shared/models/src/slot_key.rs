//! Date keys and time labels as the booking backend stores them.
//!
//! A date key is `day_month_year` with no zero padding (`5_6_2025`). A time
//! label is the 12-hour clock rendering `hh:mm AM/PM` (`01:30 PM`). Both are
//! the keys of a doctor's `slots_booked` map, so the generator must render
//! them exactly the way bookings were recorded.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const TIME_LABEL_FORMAT: &str = "%I:%M %p";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotKeyError {
    #[error("Invalid slot date: {0}")]
    InvalidDateKey(String),

    #[error("Invalid slot time: {0}")]
    InvalidTimeLabel(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// `Jun 05, 2025`
    pub fn display_date(&self) -> String {
        self.0.format("%b %d, %Y").to_string()
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.0.day(), self.0.month(), self.0.year())
    }
}

impl FromStr for DateKey {
    type Err = SlotKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SlotKeyError::InvalidDateKey(s.to_string());

        let mut parts = s.trim().split('_');
        let (Some(day), Some(month), Some(year), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        let day: u32 = day.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        let year: i32 = year.parse().map_err(|_| invalid())?;

        NaiveDate::from_ymd_opt(year, month, day)
            .map(DateKey)
            .ok_or_else(invalid)
    }
}

impl TryFrom<String> for DateKey {
    type Error = SlotKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DateKey> for String {
    fn from(key: DateKey) -> Self {
        key.to_string()
    }
}

/// A 12-hour time label. Keeps the text it was built from so lookups in
/// `slots_booked` compare against exactly what the backend stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeLabel {
    raw: String,
    time: NaiveTime,
}

impl TimeLabel {
    pub fn from_time(time: NaiveTime) -> Self {
        Self {
            raw: time.format(TIME_LABEL_FORMAT).to_string(),
            time,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }
}

impl fmt::Display for TimeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for TimeLabel {
    type Err = SlotKeyError;

    /// Accepts `hh:mm AM/PM` with any of the spaces locale renderers put
    /// before the meridiem (plain, no-break, narrow no-break), and 24-hour
    /// `HH:MM` with no meridiem.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SlotKeyError::InvalidTimeLabel(s.to_string());
        let raw = s.trim();

        let (clock, meridiem) = match raw.split_once([' ', '\u{a0}', '\u{202f}']) {
            Some((clock, meridiem)) => (clock, Some(meridiem.trim())),
            None => (raw, None),
        };
        let (hours, minutes) = clock.split_once(':').ok_or_else(invalid)?;
        let hours: u32 = hours.parse().map_err(|_| invalid())?;
        let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
        if minutes > 59 {
            return Err(invalid());
        }

        let hours = match meridiem {
            None if hours < 24 => hours,
            None => return Err(invalid()),
            Some(_) if !(1..=12).contains(&hours) => return Err(invalid()),
            Some(m) => match (m.to_ascii_uppercase().as_str(), hours) {
                ("PM", h) if h < 12 => h + 12,
                ("PM", h) => h,
                ("AM", 12) => 0,
                ("AM", h) => h,
                _ => return Err(invalid()),
            },
        };

        let time = NaiveTime::from_hms_opt(hours, minutes, 0).ok_or_else(invalid)?;
        Ok(Self {
            raw: raw.to_string(),
            time,
        })
    }
}

impl TryFrom<String> for TimeLabel {
    type Error = SlotKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeLabel> for String {
    fn from(label: TimeLabel) -> Self {
        label.raw
    }
}

/// Wall-clock instant a booking key refers to.
pub fn scheduled_at(date: &DateKey, time: &TimeLabel) -> NaiveDateTime {
    date.date().and_time(time.time())
}
