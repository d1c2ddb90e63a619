use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info};

use shared_api::UnauthorizedHandler;
use shared_config::ClientConfig;
use shared_models::auth::SessionStatus;
use shared_models::{ClientError, Doctor, Notice, Notifier, UserProfile};

pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

#[derive(Debug, Default)]
struct Session {
    token: Option<String>,
    profile: Option<UserProfile>,
}

/// Process-wide client state shared by every view: the session token, the
/// cached profile and the cached doctor directory. Services receive it as an
/// `Arc` instead of looking it up globally.
pub struct AppState {
    config: ClientConfig,
    notifier: Arc<dyn Notifier>,
    session: RwLock<Session>,
    doctors: RwLock<Vec<Doctor>>,
    status: watch::Sender<SessionStatus>,
}

impl AppState {
    pub fn new(config: ClientConfig, notifier: Arc<dyn Notifier>) -> Arc<Self> {
        let token = config.auth_token.clone();
        let initial = if token.is_some() {
            SessionStatus::SignedIn
        } else {
            SessionStatus::SignedOut
        };
        let (status, _) = watch::channel(initial);

        Arc::new(Self {
            config,
            notifier,
            session: RwLock::new(Session {
                token,
                profile: None,
            }),
            doctors: RwLock::new(Vec::new()),
            status,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn notify(&self, notice: Notice) {
        self.notifier.notify(notice);
    }

    /// Surfaces a failed call to the user, unless the session teardown
    /// already did.
    pub fn report(&self, err: &ClientError, fallback: &str) {
        if let Some(notice) = Notice::for_error(err, fallback) {
            self.notifier.notify(notice);
        }
    }

    // ==============================================================================
    // SESSION
    // ==============================================================================

    pub async fn token(&self) -> Option<String> {
        self.session.read().await.token.clone()
    }

    pub async fn require_token(&self) -> Result<String, ClientError> {
        self.token().await.ok_or(ClientError::NotAuthenticated)
    }

    pub async fn is_signed_in(&self) -> bool {
        self.session.read().await.token.is_some()
    }

    pub async fn sign_in(&self, token: String) {
        let mut session = self.session.write().await;
        session.token = Some(token);
        session.profile = None;
        drop(session);

        info!("Session started");
        self.status.send_replace(SessionStatus::SignedIn);
    }

    /// User-initiated sign-out. Silent.
    pub async fn sign_out(&self) {
        let mut session = self.session.write().await;
        session.token = None;
        session.profile = None;
        drop(session);

        info!("Signed out");
        self.status.send_replace(SessionStatus::SignedOut);
    }

    /// Tears the session down after the backend rejected `rejected_token`.
    /// Returns whether anything was torn down; repeated or stale rejections
    /// are no-ops, so the user is told exactly once.
    pub async fn expire_session(&self, rejected_token: &str) -> bool {
        let mut session = self.session.write().await;
        if session.token.as_deref() != Some(rejected_token) {
            debug!("Ignoring rejection for a token that is no longer active");
            return false;
        }
        session.token = None;
        session.profile = None;
        drop(session);

        info!("Session expired, token cleared");
        self.notifier.notify(Notice::info(SESSION_EXPIRED_MESSAGE));
        self.status.send_replace(SessionStatus::Expired);
        true
    }

    pub fn status(&self) -> SessionStatus {
        *self.status.borrow()
    }

    /// Views watch this to send the user to sign-in after an expiry.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    // ==============================================================================
    // CACHED PROFILE
    // ==============================================================================

    pub async fn profile(&self) -> Option<UserProfile> {
        self.session.read().await.profile.clone()
    }

    pub async fn set_profile(&self, profile: Option<UserProfile>) {
        self.session.write().await.profile = profile;
    }

    // ==============================================================================
    // CACHED DOCTOR DIRECTORY
    // ==============================================================================

    pub async fn doctors(&self) -> Vec<Doctor> {
        self.doctors.read().await.clone()
    }

    pub async fn replace_doctors(&self, doctors: Vec<Doctor>) {
        debug!("Caching {} doctors", doctors.len());
        *self.doctors.write().await = doctors;
    }

    pub async fn find_doctor(&self, doctor_id: &str) -> Option<Doctor> {
        self.doctors
            .read()
            .await
            .iter()
            .find(|doctor| doctor.id == doctor_id)
            .cloned()
    }
}

#[async_trait]
impl UnauthorizedHandler for AppState {
    async fn on_unauthorized(&self, rejected_token: &str) {
        self.expire_session(rejected_token).await;
    }
}
