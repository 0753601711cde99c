use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use shared_models::AppError;
use shared_store::{StoreError, Transient};

// ==============================================================================
// CLINIC MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clinic {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub settings: Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClinicRequest {
    pub name: String,
    pub address: Option<String>,
    pub settings: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateClinicRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub settings: Option<Value>,
    pub is_active: Option<bool>,
}

// ==============================================================================
// OPERATING HOURS MODELS
// ==============================================================================

/// One opening window per weekday. Weekdays are Sunday-first: 0 = Sunday,
/// 6 = Saturday. Times are "HH:MM" strings, zero-padded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatingHours {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub weekday: u8,
    pub opens_at: String,
    pub closes_at: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOperatingHoursRequest {
    pub weekday: u8,
    pub opens_at: String,
    pub closes_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOperatingHoursRequest {
    pub weekday: Option<u8>,
    pub opens_at: Option<String>,
    pub closes_at: Option<String>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ClinicError {
    #[error("opening hours must be HH:MM with opens_at before closes_at")]
    InvalidHours,

    #[error("weekday must be between 0 (Sunday) and 6 (Saturday)")]
    InvalidWeekday,

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Transient for ClinicError {
    fn is_transient(&self) -> bool {
        matches!(self, ClinicError::Store(e) if e.is_transient())
    }
}

impl From<ClinicError> for AppError {
    fn from(err: ClinicError) -> Self {
        match err {
            ClinicError::Store(e) => e.into(),
            ClinicError::ValidationError(msg) => AppError::ValidationError(msg),
            other => AppError::BadRequest(other.to_string()),
        }
    }
}
