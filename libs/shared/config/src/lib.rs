use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub backend_url: String,
    pub currency_symbol: String,
    pub auth_token: Option<String>,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let config = Self {
            backend_url: env::var("BACKEND_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| {
                    warn!("BACKEND_URL not set, using empty value");
                    String::new()
                }),
            currency_symbol: env::var("CURRENCY_SYMBOL")
                .unwrap_or_else(|_| "$".to_string()),
            auth_token: env::var("BOOKING_AUTH_TOKEN")
                .ok()
                .filter(|token| !token.trim().is_empty()),
            user_agent: env::var("HTTP_USER_AGENT")
                .unwrap_or_else(|_| default_user_agent()),
        };

        if !config.is_configured() {
            warn!("Client not fully configured - missing environment variables");
        }

        config
    }

    /// Config pointed at an explicit backend, used by tests and embedders.
    pub fn for_backend(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into().trim_end_matches('/').to_string(),
            currency_symbol: "$".to_string(),
            auth_token: None,
            user_agent: default_user_agent(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.backend_url.is_empty()
    }

    pub fn format_amount(&self, amount: f64) -> String {
        if amount.fract() == 0.0 {
            format!("{}{}", self.currency_symbol, amount as i64)
        } else {
            format!("{}{:.2}", self.currency_symbol, amount)
        }
    }
}

fn default_user_agent() -> String {
    format!("clinic-booking-client/{}", env!("CARGO_PKG_VERSION"))
}
