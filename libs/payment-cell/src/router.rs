use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use shared_utils::AppState;

use crate::handlers;

pub fn payment_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(handlers::create_payment).get(handlers::list_payments))
        .route("/by-patient", get(handlers::search_payments))
        .route("/{payment_id}", get(handlers::get_payment)
            .put(handlers::update_payment)
            .delete(handlers::delete_payment))
        .with_state(state)
}
