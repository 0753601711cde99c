use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use shared_store::Store;

use crate::handlers::*;

pub fn integration_routes(store: Arc<Store>) -> Router {
    Router::new()
        .route("/", post(create_integration))
        .route(
            "/{id}",
            get(get_integration)
                .put(update_integration)
                .delete(delete_integration),
        )
        .route("/clinic/{clinic_id}", get(list_integrations_by_clinic))
        .with_state(store)
}
