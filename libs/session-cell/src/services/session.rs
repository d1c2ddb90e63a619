use std::sync::Arc;

use reqwest::Method;
use serde_json::json;
use tracing::{debug, error};

use shared_api::BackendClient;
use shared_models::auth::{LoginRequest, RegisterRequest, TokenPayload};
use shared_models::{ApiEnvelope, ClientError};

use crate::state::AppState;

pub struct SessionService {
    api: Arc<BackendClient>,
    state: Arc<AppState>,
}

impl SessionService {
    pub fn new(api: Arc<BackendClient>, state: Arc<AppState>) -> Self {
        Self { api, state }
    }

    /// Exchange credentials for a token and start a session.
    pub async fn login(&self, request: LoginRequest) -> Result<(), ClientError> {
        debug!("Signing in as {}", request.email);

        let result = self
            .exchange_token(
                "/api/user/login",
                json!({ "email": request.email, "password": request.password }),
            )
            .await;

        self.finish(result, "Login failed. Please try again.").await
    }

    /// Create an account and start a session with the returned token.
    pub async fn register(&self, request: RegisterRequest) -> Result<(), ClientError> {
        debug!("Registering account for {}", request.email);

        if request.name.trim().is_empty() {
            let err = ClientError::Validation("Name is required".to_string());
            self.state.report(&err, "");
            return Err(err);
        }

        let result = self
            .exchange_token(
                "/api/user/register",
                json!({
                    "name": request.name,
                    "email": request.email,
                    "password": request.password
                }),
            )
            .await;

        self.finish(result, "Registration failed. Please try again.").await
    }

    pub async fn logout(&self) {
        self.state.sign_out().await;
    }

    async fn exchange_token(&self, path: &str, body: serde_json::Value) -> Result<String, ClientError> {
        let envelope: ApiEnvelope<TokenPayload> = self
            .api
            .request(Method::POST, path, None, Some(body))
            .await?;

        envelope
            .into_payload("Invalid credentials")?
            .token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ClientError::InvalidResponse("token missing from response".to_string()))
    }

    async fn finish(&self, result: Result<String, ClientError>, fallback: &str) -> Result<(), ClientError> {
        match result {
            Ok(token) => {
                self.state.sign_in(token).await;
                Ok(())
            }
            Err(err) => {
                error!("Authentication failed: {}", err);
                self.state.report(&err, fallback);
                Err(err)
            }
        }
    }
}
