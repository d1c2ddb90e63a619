use serde::Deserialize;

use crate::error::ClientError;

/// The `{ success, message, ... }` wrapper every backend endpoint answers with.
/// `T` is the endpoint's own schema; its fields must tolerate being absent
/// because failed responses carry only the message.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub payload: T,
}

/// Payload for endpoints that only report success and a message.
#[derive(Debug, Default, Deserialize)]
pub struct Empty {}

impl<T> ApiEnvelope<T> {
    pub fn into_payload(self, fallback: &str) -> Result<T, ClientError> {
        if self.success {
            Ok(self.payload)
        } else {
            let message = self
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string());
            Err(ClientError::Rejected(message))
        }
    }

    pub fn message_or(&self, fallback: &str) -> String {
        self.message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}
