use std::sync::Arc;

use shared_config::ClientConfig;
use shared_models::{ClientError, Notifier};

use appointment_cell::{BookingService, PaymentService};
use doctor_cell::DoctorService;
use patient_cell::ProfileService;
use session_cell::{connect, AppState, SessionService};

/// Every service wired to one state container and one backend client.
pub struct App {
    pub state: Arc<AppState>,
    pub session: SessionService,
    pub doctors: Arc<DoctorService>,
    pub booking: BookingService,
    pub payment: PaymentService,
    pub profile: ProfileService,
}

impl App {
    pub fn connect(config: ClientConfig, notifier: Arc<dyn Notifier>) -> Result<Self, ClientError> {
        let (state, api) = connect(config, notifier)?;
        let doctors = Arc::new(DoctorService::new(api.clone(), state.clone()));

        Ok(Self {
            session: SessionService::new(api.clone(), state.clone()),
            booking: BookingService::new(api.clone(), state.clone(), doctors.clone()),
            payment: PaymentService::new(api.clone(), state.clone()),
            profile: ProfileService::new(api, state.clone()),
            doctors,
            state,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        self.state.config()
    }
}
