use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::AppError;
use shared_store::{StoreError, Transient};

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub veterinarian_id: Uuid,
    pub client_name: String,
    pub client_phone: Option<String>,
    pub pet_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub origin: AppointmentOrigin,
    pub external_event_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An appointment joined with the names a front desk actually reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentDetails {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub veterinarian_name: String,
    pub clinic_name: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Completed => "completed",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        match raw {
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            "completed" => Ok(AppointmentStatus::Completed),
            other => Err(StoreError::InvalidStored {
                field: "status",
                value: other.to_string(),
            }),
        }
    }

    /// Whether an appointment in this status blocks its time range.
    /// Cancelled rows leave the overlap domain; the slot is reusable.
    pub fn occupies_slot(&self) -> bool {
        matches!(self, AppointmentStatus::Scheduled | AppointmentStatus::Confirmed)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Cancelled | AppointmentStatus::Completed)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentOrigin {
    Chatbot,
    Manual,
    Whatsapp,
    Telegram,
}

impl AppointmentOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentOrigin::Chatbot => "chatbot",
            AppointmentOrigin::Manual => "manual",
            AppointmentOrigin::Whatsapp => "whatsapp",
            AppointmentOrigin::Telegram => "telegram",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        match raw {
            "chatbot" => Ok(AppointmentOrigin::Chatbot),
            "manual" => Ok(AppointmentOrigin::Manual),
            "whatsapp" => Ok(AppointmentOrigin::Whatsapp),
            "telegram" => Ok(AppointmentOrigin::Telegram),
            other => Err(StoreError::InvalidStored {
                field: "origin",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for AppointmentOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub clinic_id: Uuid,
    pub veterinarian_id: Uuid,
    pub client_name: String,
    pub client_phone: Option<String>,
    pub pet_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub origin: AppointmentOrigin,
    pub external_event_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub pet_name: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub origin: Option<AppointmentOrigin>,
    pub external_event_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub new_start_time: DateTime<Utc>,
    pub new_end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentSearchQuery {
    pub clinic_id: Option<Uuid>,
    pub veterinarian_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    pub origin: Option<AppointmentOrigin>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentListResponse {
    pub appointments: Vec<AppointmentDetails>,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayOccupancyQuery {
    pub veterinarian_id: Uuid,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccupiedSlot {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: AppointmentStatus,
}

/// The booked (non-cancelled) slots of one veterinarian on one date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayOccupancy {
    pub veterinarian_id: Uuid,
    pub date: NaiveDate,
    pub occupied: Vec<OccupiedSlot>,
}

// ==============================================================================
// AVAILABILITY DECISION
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityDecision {
    Available,
    Unavailable(UnavailableReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnavailableReason {
    OutsideOperatingHours,
    OverlapsExistingAppointment(Uuid),
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    #[error("appointment end must be strictly after start")]
    InvalidRange,

    #[error("requested range is outside the clinic's operating hours")]
    OutsideOperatingHours,

    #[error("requested range overlaps existing appointment {0}")]
    OverlapsExistingAppointment(Uuid),

    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("appointment cannot be modified in status {0}")]
    NotModifiable(AppointmentStatus),

    #[error("veterinarian {veterinarian_id} does not belong to clinic {clinic_id}")]
    VeterinarianNotInClinic {
        veterinarian_id: Uuid,
        clinic_id: Uuid,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<UnavailableReason> for SchedulingError {
    fn from(reason: UnavailableReason) -> Self {
        match reason {
            UnavailableReason::OutsideOperatingHours => SchedulingError::OutsideOperatingHours,
            UnavailableReason::OverlapsExistingAppointment(id) => {
                SchedulingError::OverlapsExistingAppointment(id)
            }
        }
    }
}

impl Transient for SchedulingError {
    fn is_transient(&self) -> bool {
        matches!(self, SchedulingError::Store(e) if e.is_transient())
    }
}

impl From<SchedulingError> for AppError {
    fn from(err: SchedulingError) -> Self {
        match err {
            SchedulingError::Store(e) => e.into(),
            SchedulingError::OverlapsExistingAppointment(_)
            | SchedulingError::InvalidTransition { .. }
            | SchedulingError::NotModifiable(_) => AppError::Conflict(err.to_string()),
            SchedulingError::InvalidRange
            | SchedulingError::OutsideOperatingHours
            | SchedulingError::VeterinarianNotInClinic { .. } => {
                AppError::BadRequest(err.to_string())
            }
        }
    }
}
