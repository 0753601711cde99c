use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::AppError;
use shared_store::Store;

use crate::models::{CreateVeterinarianRequest, UpdateVeterinarianRequest};
use crate::services::VeterinarianService;

#[axum::debug_handler]
pub async fn create_veterinarian(
    State(store): State<Arc<Store>>,
    Json(request): Json<CreateVeterinarianRequest>,
) -> Result<Json<Value>, AppError> {
    let service = VeterinarianService::new(store);
    let vet = service.create_veterinarian(request).await?;
    Ok(Json(json!(vet)))
}

#[axum::debug_handler]
pub async fn get_veterinarian(
    State(store): State<Arc<Store>>,
    Path(vet_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = VeterinarianService::new(store);
    let vet = service.get_veterinarian(vet_id).await?;
    Ok(Json(json!(vet)))
}

#[axum::debug_handler]
pub async fn list_veterinarians_by_clinic(
    State(store): State<Arc<Store>>,
    Path(clinic_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = VeterinarianService::new(store);
    let vets = service.list_veterinarians_by_clinic(clinic_id).await?;
    Ok(Json(json!({
        "veterinarians": vets,
        "total": vets.len()
    })))
}

#[axum::debug_handler]
pub async fn update_veterinarian(
    State(store): State<Arc<Store>>,
    Path(vet_id): Path<Uuid>,
    Json(request): Json<UpdateVeterinarianRequest>,
) -> Result<Json<Value>, AppError> {
    let service = VeterinarianService::new(store);
    let vet = service.update_veterinarian(vet_id, request).await?;
    Ok(Json(json!(vet)))
}

#[axum::debug_handler]
pub async fn deactivate_veterinarian(
    State(store): State<Arc<Store>>,
    Path(vet_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = VeterinarianService::new(store);
    let vet = service.deactivate_veterinarian(vet_id).await?;
    Ok(Json(json!(vet)))
}

#[axum::debug_handler]
pub async fn delete_veterinarian(
    State(store): State<Arc<Store>>,
    Path(vet_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = VeterinarianService::new(store);
    service.delete_veterinarian(vet_id).await?;
    Ok(Json(json!({ "deleted": vet_id })))
}
