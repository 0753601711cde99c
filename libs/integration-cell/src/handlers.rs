use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::AppError;
use shared_store::Store;

use crate::models::{CreateIntegrationRequest, UpdateIntegrationRequest};
use crate::services::IntegrationService;

#[axum::debug_handler]
pub async fn create_integration(
    State(store): State<Arc<Store>>,
    Json(request): Json<CreateIntegrationRequest>,
) -> Result<Json<Value>, AppError> {
    let service = IntegrationService::new(store);
    let integration = service.create_integration(request).await?;
    Ok(Json(json!(integration)))
}

#[axum::debug_handler]
pub async fn get_integration(
    State(store): State<Arc<Store>>,
    Path(integration_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = IntegrationService::new(store);
    let integration = service.get_integration(integration_id).await?;
    Ok(Json(json!(integration)))
}

#[axum::debug_handler]
pub async fn list_integrations_by_clinic(
    State(store): State<Arc<Store>>,
    Path(clinic_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = IntegrationService::new(store);
    let integrations = service.list_integrations_by_clinic(clinic_id).await?;
    Ok(Json(json!({
        "integrations": integrations,
        "total": integrations.len()
    })))
}

#[axum::debug_handler]
pub async fn update_integration(
    State(store): State<Arc<Store>>,
    Path(integration_id): Path<Uuid>,
    Json(request): Json<UpdateIntegrationRequest>,
) -> Result<Json<Value>, AppError> {
    let service = IntegrationService::new(store);
    let integration = service.update_integration(integration_id, request).await?;
    Ok(Json(json!(integration)))
}

#[axum::debug_handler]
pub async fn delete_integration(
    State(store): State<Arc<Store>>,
    Path(integration_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = IntegrationService::new(store);
    service.delete_integration(integration_id).await?;
    Ok(Json(json!({ "deleted": integration_id })))
}
