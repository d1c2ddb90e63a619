use thiserror::Error;

use crate::slot_key::SlotKeyError;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered `success: false`, or a non-2xx status with a message.
    #[error("{0}")]
    Rejected(String),

    #[error("Your session has expired. Please log in again.")]
    Unauthorized,

    #[error("Login to continue")]
    NotAuthenticated,

    #[error("{0}")]
    Validation(String),

    #[error("This slot is already booked and cannot be selected.")]
    SlotAlreadyBooked { date_key: String, time: String },

    #[error("Unexpected response status {0}")]
    Status(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// 401s are reported once by the global session teardown, never per call site.
    pub fn is_session_expiry(&self) -> bool {
        matches!(self, ClientError::Unauthorized)
    }

    /// Text to show the user. Transport and decoding failures fall back to
    /// the call site's generic message.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Transport(_)
            | ClientError::Status(_)
            | ClientError::InvalidResponse(_)
            | ClientError::Config(_) => fallback.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::InvalidResponse(err.to_string())
    }
}

impl From<SlotKeyError> for ClientError {
    fn from(err: SlotKeyError) -> Self {
        ClientError::Validation(err.to_string())
    }
}
