use std::iter::successors;

use chrono::{Days, Duration, NaiveDateTime};

use shared_models::{DateKey, Doctor, TimeLabel};

use crate::models::{DaySlots, Slot, SlotPolicy};

/// Booking grid for `doctor` from `now` over the policy's lookahead.
///
/// Days run in order starting today; within a day slots run from the
/// opening time (or, today, the first grid boundary strictly after `now`)
/// up to but excluding closing time. Booked slots stay in the grid with
/// `is_booked` set. Days left with no slots are dropped.
pub fn generate_slots(doctor: &Doctor, now: NaiveDateTime, policy: &SlotPolicy) -> Vec<DaySlots> {
    let step = Duration::minutes(i64::from(policy.step_minutes.max(1)));
    let today = now.date();

    (0..policy.lookahead_days)
        .filter_map(|offset| {
            let date = today.checked_add_days(Days::new(offset))?;
            let day_end = date.and_time(policy.closing);
            let start = if offset == 0 {
                first_start_today(now, policy)
            } else {
                date.and_time(policy.opening)
            };

            if start >= day_end {
                return None;
            }

            let date_key = DateKey::from_date(date);
            let slots: Vec<Slot> = successors(Some(start), |t| Some(*t + step))
                .take_while(|t| *t < day_end)
                .map(|datetime| {
                    let time = TimeLabel::from_time(datetime.time());
                    Slot {
                        is_booked: doctor.is_slot_booked(&date_key, time.as_str()),
                        datetime,
                        time,
                    }
                })
                .collect();

            (!slots.is_empty()).then_some(DaySlots { date_key, slots })
        })
        .collect()
}

/// Before opening the day starts at opening time. After that it starts at
/// the next boundary of the opening-aligned grid strictly after `now`;
/// seconds are ignored. This has to land on the same grid the backend keys
/// bookings with or booked labels will never match.
fn first_start_today(now: NaiveDateTime, policy: &SlotPolicy) -> NaiveDateTime {
    let opening = now.date().and_time(policy.opening);
    if now < opening {
        return opening;
    }

    let step = i64::from(policy.step_minutes.max(1));
    let elapsed = (now - opening).num_minutes();
    opening + Duration::minutes((elapsed / step + 1) * step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Timelike};
    use serde_json::json;

    fn at(date: (i32, u32, u32), h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(date.0, date.1, date.2)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn doctor_with(slots_booked: serde_json::Value) -> Doctor {
        serde_json::from_value(json!({
            "_id": "doc1",
            "name": "Dr. Richard James",
            "speciality": "General physician",
            "slots_booked": slots_booked
        }))
        .unwrap()
    }

    #[test]
    fn test_morning_grid_starts_at_opening() {
        let doctor = doctor_with(json!({ "5_6_2025": ["10:00 AM"] }));
        let days = generate_slots(&doctor, at((2025, 6, 5), 9, 0), &SlotPolicy::default());

        assert_eq!(days.len(), 7);
        let today = &days[0];
        assert_eq!(today.date_key.to_string(), "5_6_2025");
        assert_eq!(today.slots.len(), 22);
        assert_eq!(today.slots[0].time.as_str(), "10:00 AM");
        assert!(today.slots[0].is_booked);
        assert_eq!(today.slots[1].time.as_str(), "10:30 AM");
        assert!(!today.slots[1].is_booked);
        assert_eq!(today.slots.last().unwrap().time.as_str(), "08:30 PM");
    }

    #[test]
    fn test_empty_bookings_mean_everything_free() {
        let doctor = doctor_with(json!({}));
        let days = generate_slots(&doctor, at((2025, 6, 5), 8, 0), &SlotPolicy::default());

        assert!(days.iter().flat_map(|d| &d.slots).all(|s| !s.is_booked));
    }

    #[test]
    fn test_today_rounds_up_to_next_boundary() {
        let doctor = doctor_with(json!({}));
        let policy = SlotPolicy::default();

        let cases = [((14, 10), (14, 30)), ((14, 0), (14, 30)), ((14, 30), (15, 0)), ((14, 45), (15, 0)), ((10, 0), (10, 30))];
        for ((h, m), (eh, em)) in cases {
            let days = generate_slots(&doctor, at((2025, 6, 5), h, m), &policy);
            let first = days[0].slots[0].datetime;
            assert_eq!((first.hour(), first.minute()), (eh, em), "now {}:{:02}", h, m);
        }
    }

    #[test]
    fn test_today_skipped_when_no_time_left() {
        let doctor = doctor_with(json!({}));
        let policy = SlotPolicy::default();

        let late = generate_slots(&doctor, at((2025, 6, 5), 20, 45), &policy);
        assert_eq!(late.len(), 6);
        assert_eq!(late[0].date_key.to_string(), "6_6_2025");
        assert_eq!(late[0].slots[0].time.as_str(), "10:00 AM");

        let evening = generate_slots(&doctor, at((2025, 6, 5), 20, 15), &policy);
        assert_eq!(evening[0].date_key.to_string(), "5_6_2025");
        assert_eq!(evening[0].slots.len(), 1);
        assert_eq!(evening[0].slots[0].time.as_str(), "08:30 PM");
    }

    #[test]
    fn test_slots_stay_inside_opening_hours() {
        let doctor = doctor_with(json!({}));
        let policy = SlotPolicy::default();
        let opening = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        let closing = NaiveTime::from_hms_opt(21, 0, 0).unwrap();

        for hour in 0..24 {
            let days = generate_slots(&doctor, at((2025, 6, 5), hour, 17), &policy);
            for slot in days.iter().flat_map(|d| &d.slots) {
                assert!(slot.datetime.time() >= opening && slot.datetime.time() < closing);
            }
        }
    }

    #[test]
    fn test_days_and_times_ascending() {
        let doctor = doctor_with(json!({}));
        let days = generate_slots(&doctor, at((2025, 12, 29), 13, 5), &SlotPolicy::default());

        let all: Vec<_> = days.iter().flat_map(|d| d.slots.iter().map(|s| s.datetime)).collect();
        assert!(all.windows(2).all(|w| w[0] < w[1]));
        // crosses the year boundary with unpadded keys
        assert_eq!(days.last().unwrap().date_key.to_string(), "4_1_2026");
    }

    #[test]
    fn test_booked_iff_listed_for_that_day() {
        let doctor = doctor_with(json!({
            "6_6_2025": ["11:00 AM", "07:30 PM"],
            "7_6_2025": ["11:00 AM"]
        }));
        let days = generate_slots(&doctor, at((2025, 6, 5), 9, 0), &SlotPolicy::default());

        for day in &days {
            let listed = doctor.slots_booked.get(&day.date_key.to_string());
            for slot in &day.slots {
                let expected = listed.is_some_and(|l| l.iter().any(|t| t == slot.time.as_str()));
                assert_eq!(slot.is_booked, expected);
            }
        }
        assert_eq!(days[1].free_slots().count(), 20);
        assert!(days[1].find("07:30 PM").unwrap().is_booked);
    }
}
