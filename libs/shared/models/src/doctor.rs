use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::slot_key::DateKey;

/// Booked time labels keyed by date key, as returned by the directory.
pub type SlotsBooked = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub line1: String,
    #[serde(default)]
    pub line2: String,
}

impl Address {
    pub fn is_empty(&self) -> bool {
        self.line1.trim().is_empty() && self.line2.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub speciality: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub about: String,
    #[serde(default)]
    pub fees: f64,
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub slots_booked: SlotsBooked,
}

impl Doctor {
    /// True iff `time` is recorded as booked for the given day.
    pub fn is_slot_booked(&self, date: &DateKey, time: &str) -> bool {
        self.slots_booked
            .get(&date.to_string())
            .is_some_and(|times| times.iter().any(|booked| booked == time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_doctor_from_directory_payload() {
        let doctor: Doctor = serde_json::from_value(json!({
            "_id": "doc1",
            "name": "Dr. Richard James",
            "speciality": "General physician",
            "fees": 50,
            "available": true,
            "address": { "line1": "17th Cross, Richmond", "line2": "Circle, Ring Road, London" },
            "slots_booked": { "5_6_2025": ["10:00 AM", "11:30 AM"] }
        }))
        .unwrap();

        let day: DateKey = "5_6_2025".parse().unwrap();
        let other_day: DateKey = "6_6_2025".parse().unwrap();

        assert_eq!(doctor.id, "doc1");
        assert_eq!(doctor.fees, 50.0);
        assert!(doctor.is_slot_booked(&day, "10:00 AM"));
        assert!(!doctor.is_slot_booked(&day, "10:30 AM"));
        assert!(!doctor.is_slot_booked(&other_day, "10:00 AM"));
    }

    #[test]
    fn test_missing_slots_booked_defaults_empty() {
        let doctor: Doctor = serde_json::from_value(json!({
            "_id": "doc2",
            "name": "Dr. Emily Larson",
            "speciality": "Gynecologist"
        }))
        .unwrap();

        assert!(doctor.slots_booked.is_empty());
        assert!(doctor.address.is_empty());
    }
}
