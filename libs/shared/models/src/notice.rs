use tracing::{error, info, warn};

use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    /// Notice for a failed call, or `None` when the session teardown already
    /// told the user.
    pub fn for_error(err: &ClientError, fallback: &str) -> Option<Self> {
        match err {
            ClientError::Unauthorized => None,
            ClientError::NotAuthenticated => Some(Self::warning(err.user_message(fallback))),
            other => Some(Self::error(other.user_message(fallback))),
        }
    }
}

/// Where notices go. Front-ends supply their own; tests record them.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success | NoticeLevel::Info => info!("{}", notice.message),
            NoticeLevel::Warning => warn!("{}", notice.message),
            NoticeLevel::Error => error!("{}", notice.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_produces_no_local_notice() {
        assert!(Notice::for_error(&ClientError::Unauthorized, "fallback").is_none());
    }

    #[test]
    fn test_not_authenticated_is_a_warning() {
        let notice = Notice::for_error(&ClientError::NotAuthenticated, "fallback").unwrap();
        assert_eq!(notice.level, NoticeLevel::Warning);
    }

    #[test]
    fn test_rejection_is_an_error_with_backend_text() {
        let notice =
            Notice::for_error(&ClientError::Rejected("Slot not available".into()), "x").unwrap();
        assert_eq!(notice, Notice::error("Slot not available"));
    }
}
