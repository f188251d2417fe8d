use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use doctor_cell::SpecializationMatcher;
use shared_models::error::AppError;
use shared_models::TreatmentCategory;
use shared_utils::AppState;

use crate::models::{CreateTreatmentRequest, TreatmentSearchQuery, UpdateTreatmentRequest};
use crate::services::TreatmentService;

#[axum::debug_handler]
pub async fn create_treatment(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateTreatmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let treatment = TreatmentService::new(state.store.clone())
        .create_treatment(request)
        .await?;

    Ok((StatusCode::CREATED, Json(json!(treatment))))
}

#[axum::debug_handler]
pub async fn list_treatments(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    let treatments = TreatmentService::new(state.store.clone())
        .list_treatments()
        .await?;

    Ok(Json(json!({
        "treatments": treatments,
        "total": treatments.len()
    })))
}

#[axum::debug_handler]
pub async fn search_treatments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TreatmentSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let treatments = TreatmentService::new(state.store.clone())
        .search_treatments_by_name(&query.name)
        .await?;

    Ok(Json(json!({
        "treatments": treatments,
        "total": treatments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_treatments_for_category(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> Result<Json<Value>, AppError> {
    let category = category.parse::<TreatmentCategory>()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let treatments = SpecializationMatcher::new(state.store.clone())
        .treatments_for(category)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!({
        "category": category,
        "treatments": treatments,
        "total": treatments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_treatment(
    State(state): State<Arc<AppState>>,
    Path(treatment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let treatment = TreatmentService::new(state.store.clone())
        .get_treatment(treatment_id)
        .await?;

    Ok(Json(json!(treatment)))
}

#[axum::debug_handler]
pub async fn update_treatment(
    State(state): State<Arc<AppState>>,
    Path(treatment_id): Path<Uuid>,
    Json(request): Json<UpdateTreatmentRequest>,
) -> Result<Json<Value>, AppError> {
    let treatment = TreatmentService::new(state.store.clone())
        .update_treatment(treatment_id, request)
        .await?;

    Ok(Json(json!(treatment)))
}

#[axum::debug_handler]
pub async fn delete_treatment(
    State(state): State<Arc<AppState>>,
    Path(treatment_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    TreatmentService::new(state.store.clone())
        .delete_treatment(treatment_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
