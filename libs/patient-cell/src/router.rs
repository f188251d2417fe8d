use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use shared_utils::AppState;

use crate::handlers;

pub fn patient_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(handlers::create_patient).get(handlers::list_patients))
        .route("/search", get(handlers::search_patients))
        .route("/{patient_id}", get(handlers::get_patient)
            .put(handlers::update_patient)
            .delete(handlers::delete_patient))
        .with_state(state)
}
