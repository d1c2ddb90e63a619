use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doctor_cell::{DoctorService, TOP_DOCTORS};
use session_cell::{connect, AppState};
use shared_models::{ClientError, NoticeLevel};
use shared_utils::test_utils::{MockBackendResponses, RecordingNotifier, TestConfig};

async fn setup(mock_server: &MockServer) -> (DoctorService, Arc<AppState>, Arc<RecordingNotifier>) {
    let notifier = RecordingNotifier::shared();
    let (state, api) = connect(
        TestConfig::with_backend(mock_server.uri()).to_client_config(),
        notifier.clone(),
    )
    .unwrap();
    (DoctorService::new(api, state.clone()), state, notifier)
}

async fn mount_directory(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/doctor/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::doctor_list(vec![
            MockBackendResponses::doctor("doc1", "Dr. Richard James", "General physician", json!({
                "5_6_2025": ["10:00 AM"]
            })),
            MockBackendResponses::doctor("doc2", "Dr. Emily Larson", "Gynecologist", json!({})),
            MockBackendResponses::doctor("doc3", "Dr. Sarah Patel", "General physician", json!({})),
        ])))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_refresh_directory_caches_doctors() {
    let mock_server = MockServer::start().await;
    mount_directory(&mock_server).await;
    let (service, state, notifier) = setup(&mock_server).await;

    let doctors = tokio_test::assert_ok!(service.refresh_directory().await);

    assert_eq!(doctors.len(), 3);
    assert_eq!(state.doctors().await.len(), 3);
    assert_eq!(service.find("doc2").await.unwrap().speciality, "Gynecologist");
    assert_eq!(service.specialities().await, vec!["All", "General physician", "Gynecologist"]);
    assert_eq!(service.top(TOP_DOCTORS).await.len(), 3);

    let doc1 = service.find("doc1").await.unwrap();
    let related: Vec<_> = service.related(&doc1).await.into_iter().map(|d| d.id).collect();
    assert_eq!(related, vec!["doc3"]);
    assert!(notifier.notices().is_empty());
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_directory() {
    let mock_server = MockServer::start().await;
    let (service, state, notifier) = setup(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api/doctor/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::doctor_list(vec![
            MockBackendResponses::doctor("doc1", "Dr. Richard James", "General physician", json!({})),
        ])))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/doctor/list"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(MockBackendResponses::failure("Directory unavailable")),
        )
        .mount(&mock_server)
        .await;

    service.refresh_directory().await.unwrap();
    let second = service.refresh_directory().await;

    assert_matches!(second, Err(ClientError::Rejected(msg)) if msg == "Directory unavailable");
    assert_eq!(state.doctors().await.len(), 1);
    assert_eq!(notifier.messages(), vec!["Directory unavailable"]);
    assert_eq!(notifier.notices()[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn test_transport_failure_uses_generic_message() {
    let mock_server = MockServer::start().await;
    let (service, _, notifier) = setup(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api/doctor/list"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    tokio_test::assert_err!(service.refresh_directory().await);
    assert_eq!(notifier.messages(), vec!["Failed to load doctors."]);
}

#[tokio::test]
async fn test_slots_for_cached_doctor() {
    let mock_server = MockServer::start().await;
    mount_directory(&mock_server).await;
    let (service, _, _) = setup(&mock_server).await;
    service.refresh_directory().await.unwrap();

    let now = NaiveDate::from_ymd_opt(2025, 6, 5).unwrap().and_hms_opt(9, 0, 0).unwrap();
    let days = service.slots_for("doc1", now).await.unwrap();

    assert_eq!(days[0].date_key.to_string(), "5_6_2025");
    assert!(days[0].slots[0].is_booked);
    assert!(!days[0].slots[1].is_booked);

    assert_matches!(service.slots_for("missing", now).await, Err(ClientError::Validation(_)));
}
