use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::AppError;
use shared_store::{StoreError, Transient};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Veterinarian {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub name: String,
    pub email: String,
    pub specialty: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVeterinarianRequest {
    pub clinic_id: Uuid,
    pub name: String,
    pub email: String,
    pub specialty: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateVeterinarianRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub specialty: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
pub enum VetError {
    #[error("validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Transient for VetError {
    fn is_transient(&self) -> bool {
        matches!(self, VetError::Store(e) if e.is_transient())
    }
}

impl From<VetError> for AppError {
    fn from(err: VetError) -> Self {
        match err {
            VetError::Store(e) => e.into(),
            VetError::ValidationError(msg) => AppError::ValidationError(msg),
        }
    }
}
