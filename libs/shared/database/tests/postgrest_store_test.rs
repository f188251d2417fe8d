use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_config::AppConfig;
use shared_database::{RecordStore, StoreError, SupabaseRecordStore};
use shared_models::{AppointmentStatus, TreatmentCategory};

fn config_for(server: &MockServer) -> AppConfig {
    AppConfig {
        supabase_url: server.uri(),
        supabase_anon_key: "test-anon-key".to_string(),
        supabase_service_key: Some("test-service-key".to_string()),
        ..AppConfig::default()
    }
}

fn patient_json(id: Uuid) -> serde_json::Value {
    json!({
        "id": id,
        "first_name": "Maria",
        "last_name": "Ionescu",
        "email": "maria@example.com",
        "phone_number": "0711111111",
        "address": { "country": "Romania", "city": "Cluj", "street": "Horea", "number": 4 },
        "birth_date": "1985-03-02",
        "gender": "Female",
        "medical_history": "none"
    })
}

fn doctor_json(id: Uuid) -> serde_json::Value {
    json!({
        "id": id,
        "first_name": "John",
        "last_name": "Smith",
        "email": "smith@clinic.com",
        "phone_number": "0722222222",
        "address": { "country": "Romania", "city": "Cluj", "street": "Motilor", "number": 10 },
        "specializations": ["CARDIOLOGY", "NEUROLOGY"]
    })
}

fn treatment_json(id: Uuid) -> serde_json::Value {
    json!({
        "id": id,
        "name": "ECG",
        "category": "CARDIOLOGY",
        "price": 120.0
    })
}

#[tokio::test]
async fn test_list_appointments_hydrates_embedded_records() {
    let server = MockServer::start().await;
    let (appointment_id, patient_id, doctor_id, treatment_id) =
        (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("order", "date.asc"))
        .and(header("apikey", "test-anon-key"))
        .and(header("authorization", "Bearer test-service-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": appointment_id,
            "date": "2024-06-10T09:00:00",
            "patient_id": patient_id,
            "doctor_id": doctor_id,
            "treatment_id": treatment_id,
            "status": "SCHEDULED",
            "patient": patient_json(patient_id),
            "doctor": doctor_json(doctor_id),
            "treatment": treatment_json(treatment_id)
        }])))
        .mount(&server)
        .await;

    let store = SupabaseRecordStore::new(&config_for(&server));
    let appointments = store.list_appointments().await.unwrap();

    assert_eq!(appointments.len(), 1);
    let appointment = &appointments[0];
    assert_eq!(appointment.id, appointment_id);
    assert_eq!(appointment.status, AppointmentStatus::Scheduled);
    assert_eq!(appointment.patient.full_name(), "Maria Ionescu");
    assert!(appointment.doctor.offers(TreatmentCategory::Neurology));
    assert_eq!(appointment.treatment.category, TreatmentCategory::Cardiology);
}

#[tokio::test]
async fn test_get_doctor_returns_none_for_empty_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let store = SupabaseRecordStore::new(&config_for(&server));
    let doctor_id = Uuid::new_v4();

    assert!(store.get_doctor(doctor_id).await.unwrap().is_none());
    assert!(!store.doctor_exists(doctor_id).await.unwrap());
}

#[tokio::test]
async fn test_delete_without_representation_is_no_rows_affected() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/treatments"))
        .and(query_param("id", format!("eq.{}", id)))
        .and(header("prefer", "return=representation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let store = SupabaseRecordStore::new(&config_for(&server));
    let result = store.delete_treatment(id).await;

    assert_matches!(result, Err(StoreError::NoRowsAffected { entity: "treatment", .. }));
}

#[tokio::test]
async fn test_foreign_key_violation_maps_to_conflict() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23503",
            "message": "update or delete on table \"patients\" violates foreign key constraint"
        })))
        .mount(&server)
        .await;

    let store = SupabaseRecordStore::new(&config_for(&server));

    assert_matches!(store.delete_patient(id).await, Err(StoreError::Conflict(_)));
}

#[tokio::test]
async fn test_unreachable_store_is_reported() {
    let config = AppConfig {
        supabase_url: "http://127.0.0.1:9".to_string(),
        supabase_anon_key: "test-anon-key".to_string(),
        ..AppConfig::default()
    };
    let store = SupabaseRecordStore::new(&config);

    assert_matches!(store.list_patients().await, Err(StoreError::Unreachable(_)));
}
