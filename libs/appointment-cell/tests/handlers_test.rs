// libs/appointment-cell/tests/handlers_test.rs
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use appointment_cell::appointment_routes;
use shared_utils::test_utils::{ClinicFixtures, SeededClinic};

fn app(clinic: &SeededClinic) -> Router {
    appointment_routes(Arc::new(clinic.state.clone()))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if body.is_empty() { Value::Null } else { serde_json::from_slice(&body).unwrap() };
    (status, json)
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn booking(clinic: &SeededClinic, date: &str) -> Value {
    json!({
        "patient_id": clinic.patient.id,
        "treatment_id": clinic.ecg.id,
        "doctor_id": clinic.smith.id,
        "date": date
    })
}

#[tokio::test]
async fn test_create_appointment_starts_scheduled() {
    let clinic = SeededClinic::new().await;

    let (status, json) = send(app(&clinic), request("POST", "/", Some(booking(&clinic, "2024-06-10T09:00:00")))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["status"], "SCHEDULED");
    assert_eq!(json["date"], "2024-06-10T09:00:00");
    assert_eq!(json["doctor"]["last_name"], "Smith");
    assert_eq!(json["treatment"]["category"], "CARDIOLOGY");
}

#[tokio::test]
async fn test_double_booking_is_unavailable() {
    let clinic = SeededClinic::new().await;

    let (status, _) = send(app(&clinic), request("POST", "/", Some(booking(&clinic, "2024-06-10T09:00:00")))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = send(app(&clinic), request("POST", "/", Some(booking(&clinic, "2024-06-10T09:00:00")))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["kind"], "unavailable");

    let (_, json) = send(app(&clinic), request("GET", "/", None)).await;
    assert_eq!(json["total"], 1);
}

#[tokio::test]
async fn test_weekend_and_off_grid_bookings_are_invalid_dates() {
    let clinic = SeededClinic::new().await;

    for date in ["2024-06-08T09:00:00", "2024-06-10T09:30:00", "2024-06-10T16:00:00"] {
        let (status, json) = send(app(&clinic), request("POST", "/", Some(booking(&clinic, date)))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", date);
        assert_eq!(json["kind"], "invalid_date");
    }
}

#[tokio::test]
async fn test_mismatched_doctor_is_unavailable() {
    let clinic = SeededClinic::new().await;
    let mut body = booking(&clinic, "2024-06-10T09:00:00");
    body["doctor_id"] = json!(clinic.jones.id);

    let (status, json) = send(app(&clinic), request("POST", "/", Some(body))).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["kind"], "unavailable");
}

#[tokio::test]
async fn test_unknown_patient_is_not_found() {
    let clinic = SeededClinic::new().await;
    let mut body = booking(&clinic, "2024-06-10T09:00:00");
    body["patient_id"] = json!(uuid::Uuid::new_v4());

    let (status, json) = send(app(&clinic), request("POST", "/", Some(body))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["kind"], "not_found");
}

#[tokio::test]
async fn test_current_day_rolls_saturday_to_monday() {
    let clinic = SeededClinic::new().await;
    let monday = clinic.book(&clinic.smith, &clinic.ecg, ClinicFixtures::at(2024, 6, 10, 9)).await;
    clinic.book(&clinic.smith, &clinic.ecg, ClinicFixtures::at(2024, 6, 11, 9)).await;

    let (status, json) = send(app(&clinic), request("GET", "/current?today=2024-06-08", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["day"], "2024-06-10");
    assert_eq!(json["total"], 1);
    assert_eq!(json["appointments"][0]["id"], monday.id.to_string());

    let (status, json) = send(app(&clinic), request("GET", "/current?today=June", None)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["kind"], "invalid_date");
}

#[tokio::test]
async fn test_status_can_be_set_to_any_value() {
    let clinic = SeededClinic::new().await;
    let booked = clinic.book(&clinic.smith, &clinic.ecg, ClinicFixtures::at(2024, 6, 10, 9)).await;
    let uri = format!("/{}", booked.id);

    for status in ["COMPLETED", "SCHEDULED", "NO_SHOW", "CANCELLED"] {
        let (code, json) = send(
            app(&clinic),
            request("PATCH", &uri, Some(json!({ "field": "status", "status": status }))),
        ).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(json["status"], status);
        assert_eq!(json["date"], "2024-06-10T09:00:00");
    }
}

#[tokio::test]
async fn test_reschedule_to_taken_slot_is_rejected() {
    let clinic = SeededClinic::new().await;
    let first = clinic.book(&clinic.smith, &clinic.ecg, ClinicFixtures::at(2024, 6, 10, 9)).await;
    clinic.book(&clinic.smith, &clinic.ecg, ClinicFixtures::at(2024, 6, 10, 10)).await;
    let uri = format!("/{}", first.id);

    let (status, _) = send(
        app(&clinic),
        request("PATCH", &uri, Some(json!({ "field": "date", "date": "2024-06-10T10:00:00" }))),
    ).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, json) = send(
        app(&clinic),
        request("PATCH", &uri, Some(json!({ "field": "date", "date": "2024-06-10T11:00:00" }))),
    ).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], first.id.to_string());
    assert_eq!(json["date"], "2024-06-10T11:00:00");
}

#[tokio::test]
async fn test_treatment_change_cascades_to_doctor() {
    let clinic = SeededClinic::new().await;
    let booked = clinic.book(&clinic.smith, &clinic.ecg, ClinicFixtures::at(2024, 6, 10, 9)).await;
    let uri = format!("/{}", booked.id);

    // Smith does not do dermatology, so keeping him is refused.
    let (status, json) = send(
        app(&clinic),
        request("PATCH", &uri, Some(json!({ "field": "treatment", "treatment_id": clinic.peeling.id }))),
    ).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["kind"], "unavailable");

    let (status, json) = send(
        app(&clinic),
        request("PATCH", &uri, Some(json!({
            "field": "treatment",
            "treatment_id": clinic.peeling.id,
            "doctor_id": clinic.jones.id,
            "date": "2024-06-11T13:00:00"
        }))),
    ).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["doctor"]["last_name"], "Jones");
    assert_eq!(json["treatment"]["name"], "Chemical peeling");
    assert_eq!(json["date"], "2024-06-11T13:00:00");
}

#[tokio::test]
async fn test_booking_options_and_statuses() {
    let clinic = SeededClinic::new().await;
    clinic.book(&clinic.smith, &clinic.ecg, ClinicFixtures::at(2024, 6, 10, 9)).await;

    let (status, json) = send(
        app(&clinic),
        request("GET", &format!("/options?treatment_id={}&date=2024-06-10", clinic.ecg.id), None),
    ).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["category"], "CARDIOLOGY");
    assert_eq!(json["doctors"][0]["available_slots"], json!([
        "08:00:00", "10:00:00", "11:00:00", "12:00:00", "13:00:00", "14:00:00", "15:00:00"
    ]));

    let (status, json) = send(app(&clinic), request("GET", "/statuses", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["statuses"].as_array().unwrap().len(), 6);
    assert_eq!(json["statuses"][0], "SCHEDULED");
}

#[tokio::test]
async fn test_search_and_delete() {
    let clinic = SeededClinic::new().await;
    let booked = clinic.book(&clinic.jones, &clinic.peeling, ClinicFixtures::at(2024, 6, 12, 15)).await;

    let (_, json) = send(app(&clinic), request("GET", "/by-doctor?name=jones", None)).await;
    assert_eq!(json["total"], 1);
    let (_, json) = send(app(&clinic), request("GET", "/by-patient?name=maria", None)).await;
    assert_eq!(json["total"], 1);

    let uri = format!("/{}", booked.id);
    let (status, _) = send(app(&clinic), request("DELETE", &uri, None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(app(&clinic), request("GET", &uri, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
