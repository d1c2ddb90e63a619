use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    multipart::Form,
    Client, Method, RequestBuilder, StatusCode,
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use tracing::{debug, error, warn};

use shared_config::ClientConfig;
use shared_models::ClientError;

/// Called when an authenticated request comes back 401, with the token the
/// request carried.
#[async_trait]
pub trait UnauthorizedHandler: Send + Sync {
    async fn on_unauthorized(&self, rejected_token: &str);
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

pub struct BackendClient {
    client: Client,
    base_url: String,
    unauthorized_handler: Option<Arc<dyn UnauthorizedHandler>>,
}

impl BackendClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        if !config.is_configured() {
            return Err(ClientError::Config("BACKEND_URL is not set".to_string()));
        }

        let client = Client::builder().user_agent(&config.user_agent).build()?;

        Ok(Self {
            client,
            base_url: config.backend_url.clone(),
            unauthorized_handler: None,
        })
    }

    pub fn with_unauthorized_handler(mut self, handler: Arc<dyn UnauthorizedHandler>) -> Self {
        self.unauthorized_handler = Some(handler);
        self
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }

    fn get_headers(&self, auth_token: Option<&str>) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();

        if let Some(token) = auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ClientError::Validation("Auth token contains invalid characters".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut req = self
            .client
            .request(method, &url)
            .headers(self.get_headers(auth_token)?);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        self.send(req, &url, auth_token).await
    }

    pub async fn request_multipart<T>(
        &self,
        path: &str,
        auth_token: Option<&str>,
        form: Form,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making multipart request to {}", url);

        let req = self
            .client
            .post(&url)
            .headers(self.get_headers(auth_token)?)
            .multipart(form);

        self.send(req, &url, auth_token).await
    }

    async fn send<T>(
        &self,
        req: RequestBuilder,
        url: &str,
        auth_token: Option<&str>,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        let response = req.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!("Backend rejected credentials for {}", url);
            // Only a request that carried a token can mean the session expired.
            if let (Some(token), Some(handler)) = (auth_token, &self.unauthorized_handler) {
                handler.on_unauthorized(token).await;
            }
            return Err(ClientError::Unauthorized);
        }

        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            let message = serde_json::from_str::<ErrorBody>(&error_text)
                .ok()
                .and_then(|body| body.message)
                .filter(|m| !m.trim().is_empty());

            return Err(match message {
                Some(message) => ClientError::Rejected(message),
                None => ClientError::Status(status.as_u16()),
            });
        }

        let bytes = response.bytes().await?;
        let data = serde_json::from_slice::<T>(&bytes)?;
        Ok(data)
    }
}
