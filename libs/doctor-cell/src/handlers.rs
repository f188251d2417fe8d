use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;
use shared_models::TreatmentCategory;
use shared_utils::AppState;

use crate::models::{
    AddSpecializationRequest, AvailabilityQuery, CreateDoctorRequest, DoctorSearchQuery,
    UpdateDoctorRequest,
};
use crate::services::{
    availability::parse_date, AvailabilityService, DoctorService, SpecializationMatcher,
};

pub(crate) fn parse_category(raw: &str) -> Result<TreatmentCategory, AppError> {
    raw.parse::<TreatmentCategory>()
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

#[axum::debug_handler]
pub async fn create_doctor(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateDoctorRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let doctor = DoctorService::new(state.store.clone(), state.doctor_writes.clone())
        .create_doctor(request)
        .await?;

    Ok((StatusCode::CREATED, Json(json!(doctor))))
}

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    let doctors = DoctorService::new(state.store.clone(), state.doctor_writes.clone())
        .list_doctors()
        .await?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn search_doctors(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DoctorSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let doctors = DoctorService::new(state.store.clone(), state.doctor_writes.clone())
        .search_doctors_by_name(&query.name)
        .await?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn get_doctors_for_category(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> Result<Json<Value>, AppError> {
    let category = parse_category(&category)?;

    let doctors = SpecializationMatcher::new(state.store.clone())
        .doctors_for(category)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!({
        "category": category,
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let date = parse_date(&query.date)?;

    let slots = AvailabilityService::new(state.store.clone())
        .get_available_slots(doctor_id, date)
        .await?;

    Ok(Json(json!(slots)))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let doctor = DoctorService::new(state.store.clone(), state.doctor_writes.clone())
        .get_doctor(doctor_id)
        .await?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn update_doctor(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<Uuid>,
    Json(request): Json<UpdateDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    let doctor = DoctorService::new(state.store.clone(), state.doctor_writes.clone())
        .update_doctor(doctor_id, request)
        .await?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn delete_doctor(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    DoctorService::new(state.store.clone(), state.doctor_writes.clone())
        .delete_doctor(doctor_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn add_specialization(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<Uuid>,
    Json(request): Json<AddSpecializationRequest>,
) -> Result<Json<Value>, AppError> {
    let doctor = DoctorService::new(state.store.clone(), state.doctor_writes.clone())
        .add_specialization(doctor_id, request.category)
        .await?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn remove_specialization(
    State(state): State<Arc<AppState>>,
    Path((doctor_id, category)): Path<(Uuid, String)>,
) -> Result<Json<Value>, AppError> {
    let category = parse_category(&category)?;

    let doctor = DoctorService::new(state.store.clone(), state.doctor_writes.clone())
        .remove_specialization(doctor_id, category)
        .await?;

    Ok(Json(json!(doctor)))
}
