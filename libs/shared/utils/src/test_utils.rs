use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use shared_config::ClientConfig;
use shared_models::{Address, Notice, Notifier, UserProfile};

pub const TEST_TOKEN: &str = "test-session-token";

pub struct TestConfig {
    pub backend_url: String,
    pub auth_token: Option<String>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:4000".to_string(),
            auth_token: None,
        }
    }
}

impl TestConfig {
    pub fn with_backend(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into(),
            ..Self::default()
        }
    }

    pub fn signed_in(mut self) -> Self {
        self.auth_token = Some(TEST_TOKEN.to_string());
        self
    }

    pub fn to_client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::for_backend(self.backend_url.clone());
        config.auth_token = self.auth_token.clone();
        config
    }
}

/// Collects notices so tests can assert what the user would have seen.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.notices().into_iter().map(|n| n.message).collect()
    }

    pub fn clear(&self) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.clear();
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}

pub struct MockBackendResponses;

impl MockBackendResponses {
    pub fn doctor(id: &str, name: &str, speciality: &str, slots_booked: Value) -> Value {
        json!({
            "_id": id,
            "name": name,
            "email": format!("{}@prescripto.test", id),
            "image": format!("https://cdn.prescripto.test/{}.png", id),
            "speciality": speciality,
            "degree": "MBBS",
            "experience": "4 Years",
            "about": "Committed to delivering comprehensive medical care.",
            "available": true,
            "fees": 50,
            "address": {
                "line1": "17th Cross, Richmond",
                "line2": "Circle, Ring Road, London"
            },
            "date": 1720000000000_i64,
            "slots_booked": slots_booked
        })
    }

    pub fn doctor_list(doctors: Vec<Value>) -> Value {
        json!({
            "success": true,
            "doctors": doctors
        })
    }

    pub fn appointment(id: &str, doctor_id: &str, slot_date: &str, slot_time: &str) -> Value {
        json!({
            "_id": id,
            "userId": "user-1",
            "docId": doctor_id,
            "slotDate": slot_date,
            "slotTime": slot_time,
            "userData": Self::profile_json(),
            "docData": {
                "name": "Dr. Richard James",
                "image": "https://cdn.prescripto.test/doc1.png",
                "speciality": "General physician",
                "fees": 50,
                "address": {
                    "line1": "17th Cross, Richmond",
                    "line2": "Circle, Ring Road, London"
                }
            },
            "amount": 50,
            "date": 1749100000000_i64,
            "cancelled": false,
            "payment": false,
            "isCompleted": false
        })
    }

    pub fn appointment_list(appointments: Vec<Value>) -> Value {
        json!({
            "success": true,
            "appointments": appointments
        })
    }

    pub fn profile_json() -> Value {
        json!({
            "_id": "user-1",
            "name": "Edward Vincent",
            "email": "edward@prescripto.test",
            "image": "https://cdn.prescripto.test/user-1.png",
            "phone": "+1 123 456 7890",
            "address": {
                "line1": "57th Cross, Richmond",
                "line2": "Circle, Church Road, London"
            },
            "gender": "Male",
            "dob": "2000-01-20"
        })
    }

    pub fn profile() -> UserProfile {
        UserProfile {
            id: "user-1".to_string(),
            name: "Edward Vincent".to_string(),
            email: "edward@prescripto.test".to_string(),
            image: "https://cdn.prescripto.test/user-1.png".to_string(),
            phone: "+1 123 456 7890".to_string(),
            address: Address {
                line1: "57th Cross, Richmond".to_string(),
                line2: "Circle, Church Road, London".to_string(),
            },
            gender: "Male".to_string(),
            dob: "2000-01-20".to_string(),
        }
    }

    pub fn success(message: &str) -> Value {
        json!({
            "success": true,
            "message": message
        })
    }

    pub fn failure(message: &str) -> Value {
        json!({
            "success": false,
            "message": message
        })
    }
}
