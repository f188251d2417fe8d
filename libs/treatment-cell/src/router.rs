use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use shared_utils::AppState;

use crate::handlers;

pub fn treatment_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(handlers::create_treatment).get(handlers::list_treatments))
        .route("/search", get(handlers::search_treatments))
        .route("/by-category/{category}", get(handlers::get_treatments_for_category))
        .route("/{treatment_id}", get(handlers::get_treatment)
            .put(handlers::update_treatment)
            .delete(handlers::delete_treatment))
        .with_state(state)
}
