use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use booking_flow_tests::{Clinic, LOGIN_TOKEN};
use shared_models::auth::{LoginRequest, SessionStatus};
use shared_models::{ClientError, DateKey, NoticeLevel};
use shared_utils::test_utils::MockBackendResponses;

fn at(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 5).unwrap().and_hms_opt(h, m, 0).unwrap()
}

fn key(s: &str) -> DateKey {
    s.parse().unwrap()
}

async fn signed_in_clinic() -> Clinic {
    let clinic = Clinic::start().await.unwrap();
    clinic.mount_login().await;
    clinic
        .session
        .login(LoginRequest {
            email: "edward@prescripto.test".to_string(),
            password: "secret123".to_string(),
        })
        .await
        .unwrap();
    clinic.reset().await;
    clinic.notifier.clear();
    clinic
}

#[tokio::test]
async fn test_browse_book_and_see_slot_taken() {
    let clinic = signed_in_clinic().await;
    clinic.mount_directory(json!({})).await;

    Mock::given(method("POST"))
        .and(path("/api/user/book-appointment"))
        .and(header("authorization", format!("Bearer {}", LOGIN_TOKEN).as_str()))
        .and(body_json(json!({
            "docId": "doc1",
            "slotDate": "5_6_2025",
            "slotTime": "02:30 PM"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::success("Appointment Booked")))
        .expect(1)
        .mount(&clinic.server)
        .await;

    clinic.doctors.refresh_directory().await.unwrap();

    // 14:10 rounds up to 14:30 on the half-hour grid
    let days = clinic.doctors.slots_for("doc1", at(14, 10)).await.unwrap();
    assert_eq!(days[0].slots[0].time.as_str(), "02:30 PM");
    assert_eq!(days.len(), 7);

    clinic
        .booking
        .book("doc1", &key("5_6_2025"), "02:30 PM", at(14, 10))
        .await
        .unwrap();
    assert_eq!(clinic.notifier.messages(), vec!["Appointment Booked"]);

    // the backend now reports the slot as taken
    clinic.reset().await;
    clinic.mount_directory(json!({ "5_6_2025": ["02:30 PM"] })).await;
    Mock::given(method("POST"))
        .and(path("/api/user/book-appointment"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&clinic.server)
        .await;

    clinic.doctors.refresh_directory().await.unwrap();
    let days = clinic.doctors.slots_for("doc1", at(14, 10)).await.unwrap();
    let slot = days[0].find("02:30 PM").unwrap();
    assert!(slot.is_booked);

    let again = clinic
        .booking
        .book("doc1", &key("5_6_2025"), "02:30 PM", at(14, 10))
        .await;
    assert_matches!(again, Err(ClientError::SlotAlreadyBooked { .. }));
}

#[tokio::test]
async fn test_appointments_cancel_and_pay() {
    let clinic = signed_in_clinic().await;

    let mut cancelled = MockBackendResponses::appointment("C", "doc1", "5_6_2025", "03:00 PM");
    cancelled["cancelled"] = json!(true);
    clinic
        .mount_appointments(vec![
            MockBackendResponses::appointment("A", "doc1", "6_6_2025", "10:00 AM"),
            MockBackendResponses::appointment("B", "doc1", "5_6_2025", "01:00 PM"),
            cancelled,
        ])
        .await;

    let buckets = clinic.booking.classified(at(14, 0)).await.unwrap();
    assert_eq!(buckets.upcoming[0].id, "A");
    assert_eq!(buckets.completed[0].id, "B");
    assert_eq!(buckets.cancelled[0].id, "C");

    // pay for the upcoming one
    Mock::given(method("POST"))
        .and(path("/api/user/payu-payment-initiate"))
        .and(body_json(json!({ "appointmentId": "A" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "paymentParams": {
                "action": "https://test.payu.in/_payment",
                "appointmentId": "A",
                "key": "merchant",
                "txnid": "txn-A",
                "surl": "http://localhost:4000/api/user/payu-success",
                "hash": "deadbeef"
            }
        })))
        .mount(&clinic.server)
        .await;

    let form = clinic.payment.initiate(&buckets.upcoming[0]).await.unwrap();
    let html = form.to_auto_submit_html();
    assert!(html.contains("name=\"txnid\" value=\"txn-A\""));
    assert!(!html.contains("appointmentId"));

    // the gateway sends the user back
    let back = reqwest::Url::parse("http://localhost:5173/my-appointments?payment_status=success&appointmentId=A").unwrap();
    let cleaned = clinic.payment.handle_return(&back);
    assert_eq!(cleaned.as_str(), "http://localhost:5173/my-appointments");

    // then cancel it
    clinic.mount_directory(json!({})).await;
    clinic
        .respond(
            "POST",
            "/api/user/cancel-appointment",
            200,
            MockBackendResponses::success("Appointment Cancelled"),
        )
        .await;
    let outcome = clinic.booking.cancel(&buckets.upcoming[0]).await.unwrap();
    assert!(outcome.appointments.is_some());

    assert_eq!(
        clinic.notifier.messages(),
        vec![
            "Redirecting to payment gateway...",
            "Payment successful for appointment A!",
            "Appointment Cancelled",
        ]
    );
}

#[tokio::test]
async fn test_expiry_across_services_notifies_once() {
    let clinic = signed_in_clinic().await;
    clinic
        .respond(
            "GET",
            "/api/user/my-appointments",
            401,
            MockBackendResponses::failure("Not Authorized Login Again"),
        )
        .await;
    clinic
        .respond(
            "GET",
            "/api/user/get-profile",
            401,
            MockBackendResponses::failure("Not Authorized Login Again"),
        )
        .await;

    let (appointments, profile) = futures::join!(clinic.booking.my_appointments(), clinic.profile.load_profile());

    assert_matches!(appointments, Err(ClientError::Unauthorized));
    assert_matches!(profile, Err(ClientError::Unauthorized));
    assert_eq!(clinic.state.status(), SessionStatus::Expired);
    assert_eq!(
        clinic.notifier.messages(),
        vec!["Your session has expired. Please log in again."]
    );
    assert_eq!(clinic.notifier.notices()[0].level, NoticeLevel::Info);

    // nothing authenticated goes out afterwards
    clinic.reset().await;
    clinic.mount_directory(json!({})).await;
    Mock::given(method("POST"))
        .and(path("/api/user/book-appointment"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&clinic.server)
        .await;
    clinic.doctors.refresh_directory().await.unwrap();

    let result = clinic
        .booking
        .book("doc1", &key("5_6_2025"), "02:30 PM", at(9, 0))
        .await;
    assert_matches!(result, Err(ClientError::NotAuthenticated));
}
