//! A mocked clinic backend with every client service wired against it, for
//! end-to-end flows that cross cells.

use std::sync::Arc;

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::{BookingService, PaymentService};
use doctor_cell::DoctorService;
use patient_cell::ProfileService;
use session_cell::{connect, AppState, SessionService};
use shared_models::ClientError;
use shared_utils::test_utils::{MockBackendResponses, RecordingNotifier, TestConfig};

pub const LOGIN_TOKEN: &str = "flow-token";

pub struct Clinic {
    pub server: MockServer,
    pub notifier: Arc<RecordingNotifier>,
    pub state: Arc<AppState>,
    pub session: SessionService,
    pub doctors: Arc<DoctorService>,
    pub booking: BookingService,
    pub payment: PaymentService,
    pub profile: ProfileService,
}

impl Clinic {
    /// Signed out, nothing mounted.
    pub async fn start() -> Result<Self, ClientError> {
        let server = MockServer::start().await;
        let notifier = RecordingNotifier::shared();
        let (state, api) = connect(
            TestConfig::with_backend(server.uri()).to_client_config(),
            notifier.clone(),
        )?;
        let doctors = Arc::new(DoctorService::new(api.clone(), state.clone()));

        Ok(Self {
            session: SessionService::new(api.clone(), state.clone()),
            booking: BookingService::new(api.clone(), state.clone(), doctors.clone()),
            payment: PaymentService::new(api.clone(), state.clone()),
            profile: ProfileService::new(api, state.clone()),
            doctors,
            state,
            notifier,
            server,
        })
    }

    pub async fn respond(&self, http_method: &str, endpoint: &str, status: u16, body: Value) {
        Mock::given(method(http_method))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_login(&self) {
        self.respond(
            "POST",
            "/api/user/login",
            200,
            json!({ "success": true, "token": LOGIN_TOKEN }),
        )
        .await;
    }

    /// A single doctor, `doc1`, with the given bookings.
    pub async fn mount_directory(&self, slots_booked: Value) {
        self.respond(
            "GET",
            "/api/doctor/list",
            200,
            MockBackendResponses::doctor_list(vec![MockBackendResponses::doctor(
                "doc1",
                "Dr. Richard James",
                "General physician",
                slots_booked,
            )]),
        )
        .await;
    }

    pub async fn mount_appointments(&self, appointments: Vec<Value>) {
        self.respond(
            "GET",
            "/api/user/my-appointments",
            200,
            MockBackendResponses::appointment_list(appointments),
        )
        .await;
    }

    /// Drops every mounted response so the next step can change what the
    /// backend returns.
    pub async fn reset(&self) {
        self.server.reset().await;
    }
}
