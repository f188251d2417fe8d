use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;
use shared_utils::AppState;

use crate::models::{CreatePatientRequest, PatientProfile, PatientSearchQuery, UpdatePatientRequest};
use crate::services::PatientService;

fn profiles(patients: Vec<shared_models::Patient>) -> Vec<PatientProfile> {
    patients.into_iter().map(PatientProfile::from).collect()
}

#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let patient = PatientService::new(state.store.clone())
        .create_patient(request)
        .await?;

    Ok((StatusCode::CREATED, Json(json!(PatientProfile::from(patient)))))
}

#[axum::debug_handler]
pub async fn list_patients(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    let patients = PatientService::new(state.store.clone())
        .list_patients()
        .await?;

    Ok(Json(json!({
        "total": patients.len(),
        "patients": profiles(patients)
    })))
}

#[axum::debug_handler]
pub async fn search_patients(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PatientSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let patients = PatientService::new(state.store.clone())
        .search_patients_by_name(&query.name)
        .await?;

    Ok(Json(json!({
        "total": patients.len(),
        "patients": profiles(patients)
    })))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<Arc<AppState>>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let patient = PatientService::new(state.store.clone())
        .get_patient(patient_id)
        .await?;

    Ok(Json(json!(PatientProfile::from(patient))))
}

#[axum::debug_handler]
pub async fn update_patient(
    State(state): State<Arc<AppState>>,
    Path(patient_id): Path<Uuid>,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    let patient = PatientService::new(state.store.clone())
        .update_patient(patient_id, request)
        .await?;

    Ok(Json(json!(PatientProfile::from(patient))))
}

#[axum::debug_handler]
pub async fn delete_patient(
    State(state): State<Arc<AppState>>,
    Path(patient_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    PatientService::new(state.store.clone())
        .delete_patient(patient_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
