// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use shared_utils::AppState;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(handlers::create_appointment).get(handlers::list_appointments))
        .route("/current", get(handlers::get_current_day_appointments))
        .route("/statuses", get(handlers::list_statuses))
        .route("/options", get(handlers::get_booking_options))
        .route("/by-patient", get(handlers::get_patient_appointments))
        .route("/by-doctor", get(handlers::get_doctor_appointments))
        .route("/{appointment_id}", get(handlers::get_appointment)
            .patch(handlers::update_appointment)
            .delete(handlers::delete_appointment))
        .with_state(state)
}
