use assert_matches::assert_matches;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::NaiveDate;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::models::{AppointmentError, AppointmentStatus, BookAppointmentRequest};
use appointment_cell::router::booking_routes;
use appointment_cell::services::reservation::ReservationService;
use doctor_cell::models::Slot;
use shared_config::AppConfig;

fn test_config(mock_url: &str) -> AppConfig {
    AppConfig {
        supabase_url: mock_url.to_string(),
        supabase_anon_key: "test-anon-key".to_string(),
        supabase_service_key: "test-service-key".to_string(),
        port: 0,
    }
}

fn booking_request(doctor_id: Uuid, date: NaiveDate) -> BookAppointmentRequest {
    BookAppointmentRequest {
        doctor_id,
        date,
        slot: Slot {
            start: "09:00".to_string(),
            end: "09:30".to_string(),
        },
        patient_name: "Jane Doe".to_string(),
        guardian_name: Some("John Doe".to_string()),
        phone: "0123456789".to_string(),
    }
}

fn patient_row(patient_id: &Uuid) -> serde_json::Value {
    json!({
        "id": patient_id,
        "name": "Jane Doe",
        "guardian_name": "John Doe",
        "phone": "0123456789",
        "email": null,
        "age": null,
        "gender": null,
        "created_at": "2025-12-01T10:00:00Z",
        "updated_at": "2025-12-01T10:00:00Z"
    })
}

fn appointment_row(doctor_id: &Uuid, patient_id: &Uuid) -> serde_json::Value {
    json!({
        "id": Uuid::new_v4(),
        "doctor_id": doctor_id,
        "patient_id": patient_id,
        "appointment_date": "2025-12-08",
        "week_start": "2025-12-08T00:00:00",
        "slot_start": "09:00",
        "slot_end": "09:30",
        "status": "booked",
        "created_at": "2025-12-01T10:00:00Z",
        "updated_at": "2025-12-01T10:00:00Z"
    })
}

fn unique_violation_body() -> serde_json::Value {
    json!({
        "code": "23505",
        "details": "Key (doctor_id, week_start, appointment_date, slot_start) already exists.",
        "hint": null,
        "message": "duplicate key value violates unique constraint \"appointments_reservation_key\""
    })
}

async fn mount_patient_create(server: &MockServer, patient_id: &Uuid, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([patient_row(patient_id)])))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn booking_a_free_slot_succeeds() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let patient_id = Uuid::new_v4();

    mount_patient_create(&mock_server, &patient_id, 1).await;

    // The insert must carry the derived Monday week_start for 2025-12-08
    // and the booked status; the matcher fails the test otherwise.
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .and(body_partial_json(json!({
            "doctor_id": doctor_id,
            "week_start": "2025-12-08T00:00:00",
            "appointment_date": "2025-12-08",
            "slot_start": "09:00",
            "status": "booked"
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!([appointment_row(&doctor_id, &patient_id)])),
        )
        .mount(&mock_server)
        .await;

    let service = ReservationService::new(&test_config(&mock_server.uri()));
    let date = NaiveDate::from_ymd_opt(2025, 12, 8).unwrap();

    let appointment = service.book_appointment(booking_request(doctor_id, date)).await.unwrap();

    assert_eq!(appointment.status, AppointmentStatus::Booked);
    assert_eq!(appointment.slot_start, "09:00");
    assert_eq!(appointment.week_start.date(), date);
}

#[tokio::test]
async fn sunday_bookings_fall_into_the_preceding_week() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let patient_id = Uuid::new_v4();

    mount_patient_create(&mock_server, &patient_id, 1).await;

    // 2025-12-14 is a Sunday; its partition key is Monday 2025-12-08.
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .and(body_partial_json(json!({
            "appointment_date": "2025-12-14",
            "week_start": "2025-12-08T00:00:00"
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!([appointment_row(&doctor_id, &patient_id)])),
        )
        .mount(&mock_server)
        .await;

    let service = ReservationService::new(&test_config(&mock_server.uri()));
    let sunday = NaiveDate::from_ymd_opt(2025, 12, 14).unwrap();

    let result = service.book_appointment(booking_request(doctor_id, sunday)).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn losing_the_race_returns_conflict_and_leaves_the_patient() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let patient_id = Uuid::new_v4();

    // The patient record is still created even though the reservation
    // fails: the orphan is accepted behavior.
    mount_patient_create(&mock_server, &patient_id, 1).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(409).set_body_json(unique_violation_body()))
        .mount(&mock_server)
        .await;

    let service = ReservationService::new(&test_config(&mock_server.uri()));
    let date = NaiveDate::from_ymd_opt(2025, 12, 8).unwrap();

    let result = service.book_appointment(booking_request(doctor_id, date)).await;
    assert_matches!(result, Err(AppointmentError::SlotAlreadyBooked));
}

#[tokio::test]
async fn invalid_request_has_no_side_effects() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let patient_id = Uuid::new_v4();

    // Neither the patient nor the appointment insert may run.
    mount_patient_create(&mock_server, &patient_id, 0).await;

    let service = ReservationService::new(&test_config(&mock_server.uri()));
    let date = NaiveDate::from_ymd_opt(2025, 12, 8).unwrap();

    let mut request = booking_request(doctor_id, date);
    request.phone = "  ".to_string();

    let result = service.book_appointment(request).await;
    assert_matches!(result, Err(AppointmentError::MissingField("phone")));
}

#[tokio::test]
async fn booking_endpoint_maps_conflict_to_409() {
    let mock_server = MockServer::start().await;
    let patient_id = Uuid::new_v4();

    mount_patient_create(&mock_server, &patient_id, 1).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(409).set_body_json(unique_violation_body()))
        .mount(&mock_server)
        .await;

    let app = booking_routes(Arc::new(test_config(&mock_server.uri())));

    let body = json!({
        "doctor_id": Uuid::new_v4(),
        "date": "2025-12-08",
        "slot": { "start": "09:00", "end": "09:30" },
        "patient_name": "Jane Doe",
        "phone": "0123456789"
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/appointments")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let payload: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(payload["error"], "This slot is already booked");
}

#[tokio::test]
async fn booking_endpoint_returns_the_created_appointment() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let patient_id = Uuid::new_v4();

    mount_patient_create(&mock_server, &patient_id, 1).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!([appointment_row(&doctor_id, &patient_id)])),
        )
        .mount(&mock_server)
        .await;

    let app = booking_routes(Arc::new(test_config(&mock_server.uri())));

    let body = json!({
        "doctor_id": doctor_id,
        "date": "2025-12-08",
        "slot": { "start": "09:00", "end": "09:30" },
        "patient_name": "Jane Doe",
        "guardian_name": "John Doe",
        "phone": "0123456789"
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/appointments")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let payload: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(payload["success"], true);
    assert_eq!(payload["appointment"]["status"], "booked");
}
