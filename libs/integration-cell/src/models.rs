use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use shared_models::AppError;
use shared_store::{StoreError, Transient};

/// One external-service hookup for a clinic. Credentials are an opaque blob
/// owned by the corresponding sync adapter; this cell only stores them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Integration {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub service_kind: ServiceKind,
    pub credentials: Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    GoogleCalendar,
    Whatsapp,
    Telegram,
}

impl ServiceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::GoogleCalendar => "google_calendar",
            ServiceKind::Whatsapp => "whatsapp",
            ServiceKind::Telegram => "telegram",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        match raw {
            "google_calendar" => Ok(ServiceKind::GoogleCalendar),
            "whatsapp" => Ok(ServiceKind::Whatsapp),
            "telegram" => Ok(ServiceKind::Telegram),
            other => Err(StoreError::InvalidStored {
                field: "service_kind",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIntegrationRequest {
    pub clinic_id: Uuid,
    pub service_kind: ServiceKind,
    pub credentials: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateIntegrationRequest {
    pub service_kind: Option<ServiceKind>,
    pub credentials: Option<Value>,
    pub is_active: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Transient for IntegrationError {
    fn is_transient(&self) -> bool {
        matches!(self, IntegrationError::Store(e) if e.is_transient())
    }
}

impl From<IntegrationError> for AppError {
    fn from(err: IntegrationError) -> Self {
        match err {
            IntegrationError::Store(e) => e.into(),
        }
    }
}
