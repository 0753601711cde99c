use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use appointment_cell::router::appointment_routes;
use clinic_cell::router::clinic_routes;
use integration_cell::router::integration_routes;
use shared_models::AppError;
use shared_store::{Store, StoreError};
use user_cell::router::user_routes;
use vet_cell::router::veterinarian_routes;

pub fn create_router(store: Arc<Store>) -> Router {
    Router::new()
        .route("/", get(|| async { "Vetly clinic API is running!" }))
        .route("/health", get(health_check))
        .with_state(store.clone())
        .nest("/clinics", clinic_routes(store.clone()))
        .nest("/users", user_routes(store.clone()))
        .nest("/veterinarians", veterinarian_routes(store.clone()))
        .nest("/integrations", integration_routes(store.clone()))
        .nest("/appointments", appointment_routes(store))
}

async fn health_check(State(store): State<Arc<Store>>) -> Result<Json<Value>, AppError> {
    store
        .read(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .map_err(StoreError::from)
        })
        .await?;

    Ok(Json(json!({
        "status": "ok",
        "database": "reachable",
        "timestamp": chrono::Utc::now(),
    })))
}
