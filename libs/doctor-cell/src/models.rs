use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use shared_models::{DateKey, TimeLabel};

pub use shared_models::{Address, Doctor, SlotsBooked};

/// Speciality filter value meaning "no filter".
pub const ALL_SPECIALITIES: &str = "All";

/// Doctors shown on the landing list.
pub const TOP_DOCTORS: usize = 10;

#[derive(Debug, Default, Deserialize)]
pub struct DoctorListPayload {
    #[serde(default)]
    pub doctors: Vec<Doctor>,
}

/// Consultation hours the booking grid is laid out on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotPolicy {
    pub opening: NaiveTime,
    pub closing: NaiveTime,
    pub step_minutes: u32,
    pub lookahead_days: u64,
}

impl Default for SlotPolicy {
    fn default() -> Self {
        Self {
            opening: NaiveTime::from_hms_opt(10, 0, 0).unwrap_or(NaiveTime::MIN),
            closing: NaiveTime::from_hms_opt(21, 0, 0).unwrap_or(NaiveTime::MIN),
            step_minutes: 30,
            lookahead_days: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub datetime: NaiveDateTime,
    pub time: TimeLabel,
    pub is_booked: bool,
}

/// One day of the booking grid. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySlots {
    pub date_key: DateKey,
    pub slots: Vec<Slot>,
}

impl DaySlots {
    pub fn date(&self) -> NaiveDate {
        self.date_key.date()
    }

    /// `MON`, `TUE`, ...
    pub fn weekday_label(&self) -> String {
        self.date().format("%a").to_string().to_uppercase()
    }

    pub fn find(&self, time: &str) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.time.as_str() == time)
    }

    pub fn free_slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter().filter(|slot| !slot.is_booked)
    }
}
