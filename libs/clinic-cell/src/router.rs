use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use shared_store::Store;

use crate::handlers::*;

pub fn clinic_routes(store: Arc<Store>) -> Router {
    Router::new()
        .route("/", post(create_clinic).get(list_clinics))
        .route(
            "/{id}",
            get(get_clinic).put(update_clinic).delete(delete_clinic),
        )
        .route("/{id}/deactivate", post(deactivate_clinic))
        .route(
            "/{id}/hours",
            post(create_operating_hours).get(list_operating_hours),
        )
        .route(
            "/hours/{id}",
            get(get_operating_hours)
                .put(update_operating_hours)
                .delete(delete_operating_hours),
        )
        .with_state(store)
}
