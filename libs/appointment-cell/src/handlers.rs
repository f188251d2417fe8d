// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use doctor_cell::services::availability::parse_date;
use shared_models::error::AppError;
use shared_models::AppointmentStatus;
use shared_utils::AppState;

use crate::models::{
    AppointmentUpdate, BookingOptionsQuery, CreateAppointmentRequest, CurrentDayQuery, NameQuery,
};
use crate::services::{AppointmentBookingService, AppointmentLifecycleService, CurrentDayService};

fn lifecycle(state: &AppState) -> AppointmentLifecycleService {
    AppointmentLifecycleService::new(state.store.clone(), state.scheduling_locks.clone())
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let appointment = lifecycle(&state).create_appointment(request).await?;

    Ok((StatusCode::CREATED, Json(json!(appointment))))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    let appointments = AppointmentBookingService::new(state.store.clone())
        .list_appointments()
        .await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_current_day_appointments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CurrentDayQuery>,
) -> Result<Json<Value>, AppError> {
    let today = query.today.as_deref().map(parse_date).transpose()?;

    let current = CurrentDayService::new(state.store.clone())
        .appointments_for(today)
        .await?;

    Ok(Json(json!(current)))
}

#[axum::debug_handler]
pub async fn list_statuses() -> Json<Value> {
    Json(json!({ "statuses": AppointmentStatus::ALL }))
}

#[axum::debug_handler]
pub async fn get_booking_options(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BookingOptionsQuery>,
) -> Result<Json<Value>, AppError> {
    let date = parse_date(&query.date)?;

    let options = AppointmentBookingService::new(state.store.clone())
        .booking_options(query.treatment_id, date)
        .await?;

    Ok(Json(json!(options)))
}

#[axum::debug_handler]
pub async fn get_patient_appointments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NameQuery>,
) -> Result<Json<Value>, AppError> {
    let appointments = AppointmentBookingService::new(state.store.clone())
        .appointments_for_patient(&query.name)
        .await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_doctor_appointments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NameQuery>,
) -> Result<Json<Value>, AppError> {
    let appointments = AppointmentBookingService::new(state.store.clone())
        .appointments_for_doctor(&query.name)
        .await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = AppointmentBookingService::new(state.store.clone())
        .get_appointment(appointment_id)
        .await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<Uuid>,
    Json(change): Json<AppointmentUpdate>,
) -> Result<Json<Value>, AppError> {
    let appointment = lifecycle(&state)
        .update_appointment(appointment_id, change)
        .await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    AppointmentBookingService::new(state.store.clone())
        .delete_appointment(appointment_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
