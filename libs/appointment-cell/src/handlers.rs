use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::AppError;
use shared_store::Store;

use crate::models::{
    AppointmentSearchQuery, CreateAppointmentRequest, DayOccupancyQuery,
    RescheduleAppointmentRequest, UpdateAppointmentRequest, UpdateStatusRequest,
};
use crate::services::AppointmentBookingService;

#[axum::debug_handler]
pub async fn create_appointment(
    State(store): State<Arc<Store>>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(store);
    let details = service.create_appointment(request).await?;
    Ok(Json(json!(details)))
}

#[axum::debug_handler]
pub async fn search_appointments(
    State(store): State<Arc<Store>>,
    Query(query): Query<AppointmentSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(store);
    let page = service.search_appointments(query).await?;
    Ok(Json(json!(page)))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(store): State<Arc<Store>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(store);
    let details = service.get_appointment(appointment_id).await?;
    Ok(Json(json!(details)))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(store): State<Arc<Store>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(store);
    let details = service.update_appointment(appointment_id, request).await?;
    Ok(Json(json!(details)))
}

#[axum::debug_handler]
pub async fn update_appointment_status(
    State(store): State<Arc<Store>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(store);
    let details = service.update_status(appointment_id, request.status).await?;
    Ok(Json(json!(details)))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(store): State<Arc<Store>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(store);
    let details = service.cancel_appointment(appointment_id).await?;
    Ok(Json(json!(details)))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(store): State<Arc<Store>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(store);
    let details = service
        .reschedule_appointment(appointment_id, request)
        .await?;
    Ok(Json(json!(details)))
}

#[axum::debug_handler]
pub async fn day_occupancy(
    State(store): State<Arc<Store>>,
    Query(query): Query<DayOccupancyQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(store);
    let occupancy = service
        .day_occupancy(query.veterinarian_id, query.date)
        .await?;
    Ok(Json(json!(occupancy)))
}
