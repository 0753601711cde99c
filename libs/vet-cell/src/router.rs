use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use shared_store::Store;

use crate::handlers::*;

pub fn veterinarian_routes(store: Arc<Store>) -> Router {
    Router::new()
        .route("/", post(create_veterinarian))
        .route(
            "/{id}",
            get(get_veterinarian)
                .put(update_veterinarian)
                .delete(delete_veterinarian),
        )
        .route("/{id}/deactivate", post(deactivate_veterinarian))
        .route("/clinic/{clinic_id}", get(list_veterinarians_by_clinic))
        .with_state(store)
}
