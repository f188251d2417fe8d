use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, delete},
};

use shared_utils::AppState;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(handlers::create_doctor).get(handlers::list_doctors))
        .route("/search", get(handlers::search_doctors))
        .route("/by-category/{category}", get(handlers::get_doctors_for_category))
        .route("/{doctor_id}", get(handlers::get_doctor)
            .put(handlers::update_doctor)
            .delete(handlers::delete_doctor))
        .route("/{doctor_id}/available-slots", get(handlers::get_available_slots))
        .route("/{doctor_id}/specializations", post(handlers::add_specialization))
        .route("/{doctor_id}/specializations/{category}", delete(handlers::remove_specialization))
        .with_state(state)
}
