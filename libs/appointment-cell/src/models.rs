use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use reqwest::Url;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use shared_models::{scheduled_at, Address, ClientError, DateKey, Notice, TimeLabel};

// ==============================================================================
// APPOINTMENT RECORDS
// ==============================================================================

/// Doctor details copied onto the appointment when it was booked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DoctorSnapshot {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub speciality: String,
    #[serde(default)]
    pub fees: f64,
    #[serde(default)]
    pub address: Address,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum PaymentStatus {
    #[default]
    Unset,
    Paid,
    Failed,
}

impl From<Option<String>> for PaymentStatus {
    fn from(value: Option<String>) -> Self {
        match value.as_deref() {
            Some("paid") => PaymentStatus::Paid,
            Some("failed") => PaymentStatus::Failed,
            _ => PaymentStatus::Unset,
        }
    }
}

impl From<PaymentStatus> for Option<String> {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Unset => None,
            PaymentStatus::Paid => Some("paid".to_string()),
            PaymentStatus::Failed => Some("failed".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(rename = "docId")]
    pub doctor_id: String,
    pub slot_date: DateKey,
    pub slot_time: TimeLabel,
    #[serde(rename = "docData", default)]
    pub doctor: DoctorSnapshot,
    #[serde(default)]
    pub amount: f64,
    /// Booking time, milliseconds since the epoch.
    #[serde(rename = "date", default)]
    pub booked_at_ms: i64,
    #[serde(default)]
    pub cancelled: bool,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub payment_status: PaymentStatus,
}

impl Appointment {
    pub fn scheduled_at(&self) -> NaiveDateTime {
        scheduled_at(&self.slot_date, &self.slot_time)
    }

    pub fn booked_on(&self) -> Option<NaiveDate> {
        DateTime::from_timestamp_millis(self.booked_at_ms).map(|dt| dt.date_naive())
    }

    pub fn status_label(&self) -> &'static str {
        if self.cancelled {
            return "Cancelled";
        }
        match self.payment_status {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Failed => "Payment Failed",
            PaymentStatus::Unset if self.is_completed => "Completed",
            PaymentStatus::Unset => "Pending Payment",
        }
    }

    /// Open appointments that are not yet paid can be cancelled or paid.
    pub fn is_actionable(&self) -> bool {
        !self.cancelled && !self.is_completed && self.payment_status != PaymentStatus::Paid
    }

    pub fn can_cancel(&self) -> bool {
        self.is_actionable()
    }

    pub fn can_pay(&self) -> bool {
        self.is_actionable()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AppointmentListPayload {
    #[serde(default, deserialize_with = "skip_unreadable")]
    pub appointments: Vec<Appointment>,
}

/// Reads each record on its own so one the client cannot make sense of is
/// dropped with a warning instead of failing the whole list.
fn skip_unreadable<'de, D>(deserializer: D) -> Result<Vec<Appointment>, D::Error>
where
    D: Deserializer<'de>,
{
    let records = Vec::<Value>::deserialize(deserializer)?;
    Ok(records
        .into_iter()
        .filter_map(|record| {
            let id = record.get("_id").and_then(Value::as_str).unwrap_or("<no id>").to_string();
            match serde_json::from_value::<Appointment>(record) {
                Ok(appointment) => Some(appointment),
                Err(err) => {
                    warn!("Skipping unreadable appointment {}: {}", id, err);
                    None
                }
            }
        })
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Upcoming,
    Completed,
    Cancelled,
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bucket::Upcoming => write!(f, "Upcoming"),
            Bucket::Completed => write!(f, "Completed"),
            Bucket::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// Appointments split for display. Upcoming is soonest first, the other two
/// most recent first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentBuckets {
    pub upcoming: Vec<Appointment>,
    pub completed: Vec<Appointment>,
    pub cancelled: Vec<Appointment>,
}

impl AppointmentBuckets {
    pub fn get(&self, bucket: Bucket) -> &[Appointment] {
        match bucket {
            Bucket::Upcoming => &self.upcoming,
            Bucket::Completed => &self.completed,
            Bucket::Cancelled => &self.cancelled,
        }
    }

    pub fn len(&self) -> usize {
        self.upcoming.len() + self.completed.len() + self.cancelled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of a successful cancellation. `appointments` is the reloaded list,
/// absent when the reload itself failed.
#[derive(Debug, Clone)]
pub struct CancelOutcome {
    pub message: String,
    pub appointments: Option<Vec<Appointment>>,
}

// ==============================================================================
// PAYMENT
// ==============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct PaymentInitPayload {
    #[serde(rename = "paymentParams", default)]
    pub payment_params: Option<Map<String, Value>>,
}

/// The gateway's checkout form: where to POST and the hidden fields to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayForm {
    pub action: Url,
    pub fields: BTreeMap<String, String>,
}

impl GatewayForm {
    /// Every parameter except `action` and `appointmentId` becomes a hidden
    /// field. Strings are sent as-is, null as empty, anything else as JSON.
    pub fn from_params(params: &Map<String, Value>) -> Result<Self, ClientError> {
        let action = params
            .get("action")
            .and_then(Value::as_str)
            .ok_or_else(|| ClientError::InvalidResponse("payment parameters missing action".to_string()))?;
        let action = Url::parse(action)
            .map_err(|e| ClientError::InvalidResponse(format!("invalid payment action: {}", e)))?;

        let fields = params
            .iter()
            .filter(|(key, _)| key.as_str() != "action" && key.as_str() != "appointmentId")
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s.clone(),
                    Value::Null => String::new(),
                    other => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect();

        Ok(Self { action, fields })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Success,
    Failure,
    Cancelled,
    CancelledByUser,
    Unrecognized(String),
}

impl PaymentOutcome {
    pub fn parse(value: &str) -> Self {
        match value {
            "success" => PaymentOutcome::Success,
            "failure" => PaymentOutcome::Failure,
            "cancelled" => PaymentOutcome::Cancelled,
            "cancelled_by_user" => PaymentOutcome::CancelledByUser,
            other => PaymentOutcome::Unrecognized(other.to_string()),
        }
    }
}

pub const PAYMENT_STATUS_PARAM: &str = "payment_status";
pub const APPOINTMENT_ID_PARAM: &str = "appointmentId";

/// What the gateway reported when it sent the user back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReturn {
    pub outcome: PaymentOutcome,
    pub appointment_id: Option<String>,
}

impl PaymentReturn {
    /// `None` unless the URL carries `payment_status`.
    pub fn from_url(url: &Url) -> Option<Self> {
        let mut outcome = None;
        let mut appointment_id = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                PAYMENT_STATUS_PARAM => outcome = Some(PaymentOutcome::parse(&value)),
                APPOINTMENT_ID_PARAM => appointment_id = Some(value.into_owned()),
                _ => {}
            }
        }

        outcome.map(|outcome| Self {
            outcome,
            appointment_id,
        })
    }

    pub fn notice(&self) -> Option<Notice> {
        let subject = match &self.appointment_id {
            Some(id) if !id.is_empty() => format!("appointment {}", id),
            _ => "your appointment".to_string(),
        };

        match &self.outcome {
            PaymentOutcome::Success => Some(Notice::success(format!("Payment successful for {}!", subject))),
            PaymentOutcome::Failure => Some(Notice::error(format!(
                "Payment failed for {}. Please try again.",
                subject
            ))),
            PaymentOutcome::Cancelled => Some(Notice::info(format!("Payment cancelled for {}.", subject))),
            PaymentOutcome::CancelledByUser => Some(Notice::info(format!(
                "Payment for {} was cancelled by user.",
                subject
            ))),
            PaymentOutcome::Unrecognized(_) => None,
        }
    }

    /// The same URL without the two payment parameters.
    pub fn strip_from(url: &Url) -> Url {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != PAYMENT_STATUS_PARAM && key != APPOINTMENT_ID_PARAM)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        let mut cleaned = url.clone();
        if kept.is_empty() {
            cleaned.set_query(None);
        } else {
            cleaned.query_pairs_mut().clear().extend_pairs(kept);
        }
        cleaned
    }
}
