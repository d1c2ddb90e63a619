use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use reqwest::Method;
use tracing::{debug, error, info, warn};

use session_cell::AppState;
use shared_api::BackendClient;
use shared_models::{ApiEnvelope, ClientError, Empty, Notice, UserProfile};

use crate::models::{ProfilePayload, ProfileUpdate};

const LOAD_FALLBACK: &str = "Failed to load profile.";
const UPDATE_FALLBACK: &str = "Failed to update profile.";

pub struct ProfileService {
    api: Arc<BackendClient>,
    state: Arc<AppState>,
}

impl ProfileService {
    pub fn new(api: Arc<BackendClient>, state: Arc<AppState>) -> Self {
        Self { api, state }
    }

    /// Fetches the signed-in user's profile into the shared state. Signed
    /// out, the cached profile is cleared and nothing is requested.
    pub async fn load_profile(&self) -> Result<Option<UserProfile>, ClientError> {
        let Some(token) = self.state.token().await else {
            debug!("No session, clearing cached profile");
            self.state.set_profile(None).await;
            return Ok(None);
        };

        match self.fetch_profile(&token).await {
            Ok(profile) => {
                self.state.set_profile(profile.clone()).await;
                Ok(profile)
            }
            Err(err) => {
                error!("Error loading profile: {}", err);
                self.state.report(&err, LOAD_FALLBACK);
                Err(err)
            }
        }
    }

    async fn fetch_profile(&self, token: &str) -> Result<Option<UserProfile>, ClientError> {
        let envelope: ApiEnvelope<ProfilePayload> = self
            .api
            .request(Method::GET, "/api/user/get-profile", Some(token), None)
            .await?;

        Ok(envelope.into_payload(LOAD_FALLBACK)?.user_data)
    }

    /// Sends the edited profile and reloads it on success. Failures are
    /// reported to the user; the return value says whether it went through.
    pub async fn update_profile(&self, update: ProfileUpdate) -> bool {
        match self.try_update(update).await {
            Ok(message) => {
                info!("Profile updated");
                self.state.notify(Notice::success(message));
                // a failed reload is reported by load_profile itself
                if let Err(err) = self.load_profile().await {
                    warn!("Profile reload after update failed: {}", err);
                }
                true
            }
            Err(err) => {
                warn!("Profile update failed: {}", err);
                self.state.report(&err, UPDATE_FALLBACK);
                false
            }
        }
    }

    async fn try_update(&self, update: ProfileUpdate) -> Result<String, ClientError> {
        let token = self.state.require_token().await?;
        update.validate().map_err(ClientError::Validation)?;

        let form = build_form(update)?;
        let envelope: ApiEnvelope<Empty> = self
            .api
            .request_multipart("/api/user/update-profile", Some(&token), form)
            .await?;

        let message = envelope.message_or("Profile updated.");
        envelope.into_payload(UPDATE_FALLBACK)?;
        Ok(message)
    }
}

fn build_form(update: ProfileUpdate) -> Result<Form, ClientError> {
    let address = serde_json::to_string(&update.address)?;
    let mut form = Form::new()
        .text("name", update.name)
        .text("phone", update.phone)
        .text("address", address)
        .text("dob", update.dob)
        .text("gender", update.gender);

    if let Some(image) = update.image {
        let mime = image.content_type();
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(mime.essence_str())?;
        form = form.part("image", part);
    }

    Ok(form)
}
