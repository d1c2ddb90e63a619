use std::sync::Arc;

use chrono::NaiveDateTime;
use reqwest::Method;
use tokio::sync::Mutex;
use tracing::{debug, error};

use session_cell::AppState;
use shared_api::BackendClient;
use shared_models::{ApiEnvelope, ClientError, Doctor};

use crate::models::{DaySlots, DoctorListPayload, SlotPolicy, ALL_SPECIALITIES};
use crate::services::slots::generate_slots;

const DIRECTORY_FALLBACK: &str = "Failed to load doctors.";

pub struct DoctorService {
    api: Arc<BackendClient>,
    state: Arc<AppState>,
    policy: SlotPolicy,
    refresh_lock: Mutex<()>,
}

impl DoctorService {
    pub fn new(api: Arc<BackendClient>, state: Arc<AppState>) -> Self {
        Self {
            api,
            state,
            policy: SlotPolicy::default(),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn with_policy(mut self, policy: SlotPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &SlotPolicy {
        &self.policy
    }

    /// Re-fetch the directory and replace the cached copy. On failure the
    /// user is notified and the previous copy stays in place. Concurrent
    /// callers queue behind the in-flight refresh.
    pub async fn refresh_directory(&self) -> Result<Vec<Doctor>, ClientError> {
        let _in_flight = self.refresh_lock.lock().await;
        debug!("Refreshing doctor directory");

        match self.fetch_directory().await {
            Ok(doctors) => {
                self.state.replace_doctors(doctors.clone()).await;
                Ok(doctors)
            }
            Err(err) => {
                error!("Error fetching doctors data: {}", err);
                self.state.report(&err, DIRECTORY_FALLBACK);
                Err(err)
            }
        }
    }

    async fn fetch_directory(&self) -> Result<Vec<Doctor>, ClientError> {
        let envelope: ApiEnvelope<DoctorListPayload> = self
            .api
            .request(Method::GET, "/api/doctor/list", None, None)
            .await?;

        Ok(envelope.into_payload(DIRECTORY_FALLBACK)?.doctors)
    }

    pub async fn doctors(&self) -> Vec<Doctor> {
        self.state.doctors().await
    }

    pub async fn find(&self, doctor_id: &str) -> Option<Doctor> {
        self.state.find_doctor(doctor_id).await
    }

    pub async fn filter_by_speciality(&self, speciality: Option<&str>) -> Vec<Doctor> {
        filter_by_speciality(&self.state.doctors().await, speciality)
    }

    pub async fn specialities(&self) -> Vec<String> {
        specialities(&self.state.doctors().await)
    }

    pub async fn related(&self, doctor: &Doctor) -> Vec<Doctor> {
        related(&self.state.doctors().await, doctor)
    }

    pub async fn top(&self, count: usize) -> Vec<Doctor> {
        self.state.doctors().await.into_iter().take(count).collect()
    }

    /// Booking grid for a cached doctor, computed against `now`.
    pub async fn slots_for(&self, doctor_id: &str, now: NaiveDateTime) -> Result<Vec<DaySlots>, ClientError> {
        let doctor = self
            .find(doctor_id)
            .await
            .ok_or_else(|| ClientError::Validation(format!("Doctor {} not found", doctor_id)))?;

        Ok(generate_slots(&doctor, now, &self.policy))
    }
}

/// `None` or `"All"` keeps everyone.
pub fn filter_by_speciality(doctors: &[Doctor], speciality: Option<&str>) -> Vec<Doctor> {
    match speciality {
        None => doctors.to_vec(),
        Some(s) if s == ALL_SPECIALITIES => doctors.to_vec(),
        Some(s) => doctors
            .iter()
            .filter(|doctor| doctor.speciality == s)
            .cloned()
            .collect(),
    }
}

/// `"All"` followed by each speciality in first-seen order.
pub fn specialities(doctors: &[Doctor]) -> Vec<String> {
    let mut seen = vec![ALL_SPECIALITIES.to_string()];
    for doctor in doctors {
        if !seen.contains(&doctor.speciality) {
            seen.push(doctor.speciality.clone());
        }
    }
    seen
}

/// Same speciality, excluding the doctor itself.
pub fn related(doctors: &[Doctor], doctor: &Doctor) -> Vec<Doctor> {
    doctors
        .iter()
        .filter(|other| other.speciality == doctor.speciality && other.id != doctor.id)
        .cloned()
        .collect()
}
