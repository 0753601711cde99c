use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use shared_store::Store;

use crate::handlers::*;

pub fn appointment_routes(store: Arc<Store>) -> Router {
    Router::new()
        .route("/", post(create_appointment).get(search_appointments))
        .route("/occupancy", get(day_occupancy))
        .route("/{id}", get(get_appointment).put(update_appointment))
        .route("/{id}/status", put(update_appointment_status))
        .route("/{id}/cancel", post(cancel_appointment))
        .route("/{id}/reschedule", post(reschedule_appointment))
        .with_state(store)
}
