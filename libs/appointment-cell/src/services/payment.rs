use std::sync::Arc;

use reqwest::{Method, Url};
use serde_json::json;
use tracing::{debug, info, warn};

use session_cell::AppState;
use shared_api::BackendClient;
use shared_models::{ApiEnvelope, ClientError, Notice};

use crate::models::{Appointment, GatewayForm, PaymentInitPayload, PaymentReturn};

const PAYMENT_FALLBACK: &str = "Payment initiation failed.";
pub const REDIRECTING_MESSAGE: &str = "Redirecting to payment gateway...";

pub struct PaymentService {
    api: Arc<BackendClient>,
    state: Arc<AppState>,
}

impl PaymentService {
    pub fn new(api: Arc<BackendClient>, state: Arc<AppState>) -> Self {
        Self { api, state }
    }

    /// Asks the backend to start a gateway payment for `appointment` and
    /// returns the form the browser has to submit.
    pub async fn initiate(&self, appointment: &Appointment) -> Result<GatewayForm, ClientError> {
        debug!("Initiating payment for appointment {}", appointment.id);

        match self.try_initiate(appointment).await {
            Ok(form) => {
                info!("Payment form ready for appointment {}", appointment.id);
                self.state.notify(Notice::info(REDIRECTING_MESSAGE));
                Ok(form)
            }
            Err(err) => {
                warn!("Payment initiation for {} failed: {}", appointment.id, err);
                self.state.report(&err, PAYMENT_FALLBACK);
                Err(err)
            }
        }
    }

    async fn try_initiate(&self, appointment: &Appointment) -> Result<GatewayForm, ClientError> {
        let token = self.state.require_token().await?;
        if !appointment.can_pay() {
            return Err(ClientError::Validation(
                "This appointment has nothing to pay.".to_string(),
            ));
        }

        let envelope: ApiEnvelope<PaymentInitPayload> = self
            .api
            .request(
                Method::POST,
                "/api/user/payu-payment-initiate",
                Some(&token),
                Some(json!({ "appointmentId": appointment.id })),
            )
            .await?;

        let params = envelope
            .into_payload(PAYMENT_FALLBACK)?
            .payment_params
            .ok_or_else(|| ClientError::InvalidResponse("payment parameters missing".to_string()))?;

        GatewayForm::from_params(&params)
    }

    /// Handles the URL the gateway sent the user back to: notifies the
    /// outcome, if any, and returns the URL with the payment parameters
    /// removed.
    pub fn handle_return(&self, url: &Url) -> Url {
        let Some(payment_return) = PaymentReturn::from_url(url) else {
            return url.clone();
        };

        info!(
            "Payment return {:?} for appointment {:?}",
            payment_return.outcome, payment_return.appointment_id
        );
        if let Some(notice) = payment_return.notice() {
            self.state.notify(notice);
        }

        PaymentReturn::strip_from(url)
    }
}

impl GatewayForm {
    /// A self-submitting HTML page that posts the form to the gateway.
    pub fn to_auto_submit_html(&self) -> String {
        let mut html = String::from(
            "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Redirecting to payment gateway</title></head>\n<body onload=\"document.forms[0].submit()\">\n",
        );
        html.push_str(&format!(
            "<form method=\"post\" action=\"{}\">\n",
            escape_html(self.action.as_str())
        ));
        for (name, value) in &self.fields {
            html.push_str(&format!(
                "<input type=\"hidden\" name=\"{}\" value=\"{}\">\n",
                escape_html(name),
                escape_html(value)
            ));
        }
        html.push_str("<noscript><button type=\"submit\">Continue to payment</button></noscript>\n</form>\n</body>\n</html>\n");
        html
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
