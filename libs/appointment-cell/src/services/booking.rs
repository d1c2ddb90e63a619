use std::sync::Arc;

use chrono::NaiveDateTime;
use reqwest::Method;
use serde_json::json;
use tracing::{debug, error, info, warn};

use doctor_cell::DoctorService;
use session_cell::AppState;
use shared_api::BackendClient;
use shared_models::{ApiEnvelope, ClientError, DateKey, Empty, Notice};

use crate::models::{Appointment, AppointmentBuckets, AppointmentListPayload, CancelOutcome};
use crate::services::classifier::classify;
use crate::services::guard::check_selection;

const BOOKING_FALLBACK: &str = "Failed to book appointment.";
const LOGIN_TO_BOOK: &str = "Login to book appointment";
const LIST_FALLBACK: &str = "Error fetching appointments. Please try again.";
const CANCEL_FALLBACK: &str = "Failed to cancel appointment.";

pub struct BookingService {
    api: Arc<BackendClient>,
    state: Arc<AppState>,
    doctors: Arc<DoctorService>,
}

impl BookingService {
    pub fn new(api: Arc<BackendClient>, state: Arc<AppState>, doctors: Arc<DoctorService>) -> Self {
        Self { api, state, doctors }
    }

    // ==============================================================================
    // BOOKING
    // ==============================================================================

    /// Books `slot_time` on `date_key` with a cached doctor. Nothing is sent
    /// unless the user is signed in and the slot is open in the current grid.
    /// Returns the backend's confirmation message.
    pub async fn book(
        &self,
        doctor_id: &str,
        date_key: &DateKey,
        slot_time: &str,
        now: NaiveDateTime,
    ) -> Result<String, ClientError> {
        debug!("Booking {} {} with doctor {}", date_key, slot_time, doctor_id);

        match self.try_book(doctor_id, date_key, slot_time, now).await {
            Ok(message) => {
                info!("Appointment booked with doctor {}", doctor_id);
                self.state.notify(Notice::success(&message));
                self.refresh_directory().await;
                Ok(message)
            }
            Err(err) => {
                warn!("Booking with doctor {} refused: {}", doctor_id, err);
                match err {
                    ClientError::NotAuthenticated => self.state.notify(Notice::warning(LOGIN_TO_BOOK)),
                    _ => self.state.report(&err, BOOKING_FALLBACK),
                }
                Err(err)
            }
        }
    }

    async fn try_book(
        &self,
        doctor_id: &str,
        date_key: &DateKey,
        slot_time: &str,
        now: NaiveDateTime,
    ) -> Result<String, ClientError> {
        let token = self.state.require_token().await?;
        let doctor = self
            .doctors
            .find(doctor_id)
            .await
            .ok_or_else(|| ClientError::Validation(format!("Doctor {} not found", doctor_id)))?;

        let time = check_selection(&doctor, date_key, slot_time, now, self.doctors.policy())?;

        let body = json!({
            "docId": doctor_id,
            "slotDate": date_key.to_string(),
            "slotTime": time.as_str(),
        });
        let envelope: ApiEnvelope<Empty> = self
            .api
            .request(Method::POST, "/api/user/book-appointment", Some(&token), Some(body))
            .await?;

        let message = envelope.message_or("Appointment booked.");
        envelope.into_payload(BOOKING_FALLBACK)?;
        Ok(message)
    }

    // ==============================================================================
    // LISTING
    // ==============================================================================

    pub async fn my_appointments(&self) -> Result<Vec<Appointment>, ClientError> {
        match self.fetch_appointments().await {
            Ok(appointments) => {
                debug!("Loaded {} appointments", appointments.len());
                Ok(appointments)
            }
            Err(err) => {
                error!("Error fetching appointments: {}", err);
                self.state.report(&err, LIST_FALLBACK);
                Err(err)
            }
        }
    }

    async fn fetch_appointments(&self) -> Result<Vec<Appointment>, ClientError> {
        let token = self.state.require_token().await?;
        let envelope: ApiEnvelope<AppointmentListPayload> = self
            .api
            .request(Method::GET, "/api/user/my-appointments", Some(&token), None)
            .await?;

        Ok(envelope.into_payload(LIST_FALLBACK)?.appointments)
    }

    pub async fn classified(&self, now: NaiveDateTime) -> Result<AppointmentBuckets, ClientError> {
        Ok(classify(self.my_appointments().await?, now))
    }

    // ==============================================================================
    // CANCELLATION
    // ==============================================================================

    /// Cancels `appointment`, then reloads both the appointment list and the
    /// doctor directory so the freed slot shows as open again.
    pub async fn cancel(&self, appointment: &Appointment) -> Result<CancelOutcome, ClientError> {
        debug!("Cancelling appointment {}", appointment.id);

        let message = match self.try_cancel(appointment).await {
            Ok(message) => message,
            Err(err) => {
                warn!("Cancellation of {} failed: {}", appointment.id, err);
                self.state.report(&err, CANCEL_FALLBACK);
                return Err(err);
            }
        };

        info!("Appointment {} cancelled", appointment.id);
        self.state.notify(Notice::success(&message));

        let appointments = self.my_appointments().await.ok();
        self.refresh_directory().await;

        Ok(CancelOutcome { message, appointments })
    }

    async fn try_cancel(&self, appointment: &Appointment) -> Result<String, ClientError> {
        let token = self.state.require_token().await?;
        if !appointment.can_cancel() {
            return Err(ClientError::Validation(
                "This appointment can no longer be cancelled.".to_string(),
            ));
        }

        let body = json!({
            "appointmentId": appointment.id,
            "docId": appointment.doctor_id,
            "slotDate": appointment.slot_date.to_string(),
            "slotTime": appointment.slot_time.as_str(),
        });
        let envelope: ApiEnvelope<Empty> = self
            .api
            .request(Method::POST, "/api/user/cancel-appointment", Some(&token), Some(body))
            .await?;

        let message = envelope.message_or("Appointment cancelled.");
        envelope.into_payload(CANCEL_FALLBACK)?;
        Ok(message)
    }

    async fn refresh_directory(&self) {
        // the directory service notifies on its own failures
        if let Err(err) = self.doctors.refresh_directory().await {
            debug!("Directory refresh after appointment change failed: {}", err);
        }
    }
}
