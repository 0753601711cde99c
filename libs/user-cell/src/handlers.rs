use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::AppError;
use shared_store::Store;

use crate::models::{CreateUserRequest, UpdateUserRequest};
use crate::services::UserService;

#[axum::debug_handler]
pub async fn create_user(
    State(store): State<Arc<Store>>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<Value>, AppError> {
    let service = UserService::new(store);
    let user = service.create_user(request).await?;
    Ok(Json(json!(user)))
}

#[axum::debug_handler]
pub async fn get_user(
    State(store): State<Arc<Store>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = UserService::new(store);
    let user = service.get_user(user_id).await?;
    Ok(Json(json!(user)))
}

#[axum::debug_handler]
pub async fn list_users_by_clinic(
    State(store): State<Arc<Store>>,
    Path(clinic_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = UserService::new(store);
    let users = service.list_users_by_clinic(clinic_id).await?;
    Ok(Json(json!({
        "users": users,
        "total": users.len()
    })))
}

#[axum::debug_handler]
pub async fn update_user(
    State(store): State<Arc<Store>>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<Value>, AppError> {
    let service = UserService::new(store);
    let user = service.update_user(user_id, request).await?;
    Ok(Json(json!(user)))
}

#[axum::debug_handler]
pub async fn deactivate_user(
    State(store): State<Arc<Store>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = UserService::new(store);
    let user = service.deactivate_user(user_id).await?;
    Ok(Json(json!(user)))
}

#[axum::debug_handler]
pub async fn delete_user(
    State(store): State<Arc<Store>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = UserService::new(store);
    service.delete_user(user_id).await?;
    Ok(Json(json!({ "deleted": user_id })))
}
