use chrono::NaiveDateTime;

use doctor_cell::{generate_slots, SlotPolicy};
use shared_models::{ClientError, DateKey, Doctor, TimeLabel};

pub const NO_SLOT_SELECTED: &str = "Please select a time slot for your appointment.";
pub const SLOT_NOT_OFFERED: &str = "The selected time is not an open slot for this doctor.";

/// Checks a slot selection before anything is sent to the backend and
/// returns the label to submit, in the grid's own rendering.
///
/// A booked slot is refused outright; so is a time the grid would not offer
/// at `now` (past, outside hours, or off the step).
pub fn check_selection(
    doctor: &Doctor,
    date_key: &DateKey,
    slot_time: &str,
    now: NaiveDateTime,
    policy: &SlotPolicy,
) -> Result<TimeLabel, ClientError> {
    if slot_time.trim().is_empty() {
        return Err(ClientError::Validation(NO_SLOT_SELECTED.to_string()));
    }

    let selected: TimeLabel = slot_time.parse()?;
    let label = TimeLabel::from_time(selected.time());

    if doctor.is_slot_booked(date_key, label.as_str()) {
        return Err(ClientError::SlotAlreadyBooked {
            date_key: date_key.to_string(),
            time: label.as_str().to_string(),
        });
    }

    let offered = generate_slots(doctor, now, policy)
        .iter()
        .find(|day| day.date_key == *date_key)
        .and_then(|day| day.find(label.as_str()))
        .is_some();
    if !offered {
        return Err(ClientError::Validation(SLOT_NOT_OFFERED.to_string()));
    }

    Ok(label)
}
