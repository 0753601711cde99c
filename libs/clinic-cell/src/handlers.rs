use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::AppError;
use shared_store::Store;

use crate::models::{
    CreateClinicRequest, CreateOperatingHoursRequest, UpdateClinicRequest,
    UpdateOperatingHoursRequest,
};
use crate::services::{ClinicService, OperatingHoursService};

#[axum::debug_handler]
pub async fn create_clinic(
    State(store): State<Arc<Store>>,
    Json(request): Json<CreateClinicRequest>,
) -> Result<Json<Value>, AppError> {
    let service = ClinicService::new(store);
    let clinic = service.create_clinic(request).await?;
    Ok(Json(json!(clinic)))
}

#[axum::debug_handler]
pub async fn list_clinics(
    State(store): State<Arc<Store>>,
) -> Result<Json<Value>, AppError> {
    let service = ClinicService::new(store);
    let clinics = service.list_clinics().await?;
    Ok(Json(json!({
        "clinics": clinics,
        "total": clinics.len()
    })))
}

#[axum::debug_handler]
pub async fn get_clinic(
    State(store): State<Arc<Store>>,
    Path(clinic_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = ClinicService::new(store);
    let clinic = service.get_clinic(clinic_id).await?;
    Ok(Json(json!(clinic)))
}

#[axum::debug_handler]
pub async fn update_clinic(
    State(store): State<Arc<Store>>,
    Path(clinic_id): Path<Uuid>,
    Json(request): Json<UpdateClinicRequest>,
) -> Result<Json<Value>, AppError> {
    let service = ClinicService::new(store);
    let clinic = service.update_clinic(clinic_id, request).await?;
    Ok(Json(json!(clinic)))
}

#[axum::debug_handler]
pub async fn deactivate_clinic(
    State(store): State<Arc<Store>>,
    Path(clinic_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = ClinicService::new(store);
    let clinic = service.deactivate_clinic(clinic_id).await?;
    Ok(Json(json!(clinic)))
}

#[axum::debug_handler]
pub async fn delete_clinic(
    State(store): State<Arc<Store>>,
    Path(clinic_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = ClinicService::new(store);
    service.delete_clinic(clinic_id).await?;
    Ok(Json(json!({ "deleted": clinic_id })))
}

#[axum::debug_handler]
pub async fn create_operating_hours(
    State(store): State<Arc<Store>>,
    Path(clinic_id): Path<Uuid>,
    Json(request): Json<CreateOperatingHoursRequest>,
) -> Result<Json<Value>, AppError> {
    let service = OperatingHoursService::new(store);
    let hours = service.create_hours(clinic_id, request).await?;
    Ok(Json(json!(hours)))
}

#[axum::debug_handler]
pub async fn list_operating_hours(
    State(store): State<Arc<Store>>,
    Path(clinic_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = OperatingHoursService::new(store);
    let hours = service.list_hours(clinic_id).await?;
    Ok(Json(json!({
        "operating_hours": hours,
        "total": hours.len()
    })))
}

#[axum::debug_handler]
pub async fn get_operating_hours(
    State(store): State<Arc<Store>>,
    Path(hours_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = OperatingHoursService::new(store);
    let hours = service.get_hours(hours_id).await?;
    Ok(Json(json!(hours)))
}

#[axum::debug_handler]
pub async fn update_operating_hours(
    State(store): State<Arc<Store>>,
    Path(hours_id): Path<Uuid>,
    Json(request): Json<UpdateOperatingHoursRequest>,
) -> Result<Json<Value>, AppError> {
    let service = OperatingHoursService::new(store);
    let hours = service.update_hours(hours_id, request).await?;
    Ok(Json(json!(hours)))
}

#[axum::debug_handler]
pub async fn delete_operating_hours(
    State(store): State<Arc<Store>>,
    Path(hours_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = OperatingHoursService::new(store);
    service.delete_hours(hours_id).await?;
    Ok(Json(json!({ "deleted": hours_id })))
}
