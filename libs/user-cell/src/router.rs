use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use shared_store::Store;

use crate::handlers::*;

pub fn user_routes(store: Arc<Store>) -> Router {
    Router::new()
        .route("/", post(create_user))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/{id}/deactivate", post(deactivate_user))
        .route("/clinic/{clinic_id}", get(list_users_by_clinic))
        .with_state(store)
}
