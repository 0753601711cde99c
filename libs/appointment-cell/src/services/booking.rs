use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_store::columns::{instant_column, uuid_column};
use shared_store::time::format_instant;
use shared_store::{Store, StoreError};

use crate::models::{
    Appointment, AppointmentDetails, AppointmentListResponse, AppointmentOrigin,
    AppointmentSearchQuery, AppointmentStatus, AvailabilityDecision, CreateAppointmentRequest,
    DayOccupancy, OccupiedSlot, RescheduleAppointmentRequest, SchedulingError,
    UpdateAppointmentRequest,
};
use crate::services::availability::check_availability;
use crate::services::lifecycle::AppointmentLifecycleService;

const DETAIL_COLUMNS: &str = "a.id, a.clinic_id, a.veterinarian_id, a.client_name, \
     a.client_phone, a.pet_name, a.start_time, a.end_time, a.status, a.origin, \
     a.external_event_id, a.created_at, a.updated_at, v.name, c.name";

const DETAIL_JOIN: &str = "FROM appointments a \
     JOIN veterinarians v ON v.id = a.veterinarian_id \
     JOIN clinics c ON c.id = a.clinic_id";

pub struct AppointmentBookingService {
    store: Arc<Store>,
    lifecycle: AppointmentLifecycleService,
}

impl AppointmentBookingService {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            lifecycle: AppointmentLifecycleService::new(),
        }
    }

    /// Book a new appointment. The availability check and the insert run in
    /// one transaction, so two concurrent requests for the same slot cannot
    /// both pass the check and both write.
    pub async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<AppointmentDetails, SchedulingError> {
        debug!(
            "Booking appointment for veterinarian {} from {} to {}",
            request.veterinarian_id, request.start_time, request.end_time
        );

        if request.end_time <= request.start_time {
            return Err(SchedulingError::InvalidRange);
        }

        let id = Uuid::new_v4();
        let details = self
            .store
            .write(|tx| {
                ensure_clinic_exists(tx, request.clinic_id)?;
                ensure_veterinarian_in_clinic(tx, request.veterinarian_id, request.clinic_id)?;

                match check_availability(
                    tx,
                    request.clinic_id,
                    request.veterinarian_id,
                    request.start_time,
                    request.end_time,
                    None,
                )? {
                    AvailabilityDecision::Available => {}
                    AvailabilityDecision::Unavailable(reason) => {
                        warn!(
                            "Booking rejected for veterinarian {}: {:?}",
                            request.veterinarian_id, reason
                        );
                        return Err(reason.into());
                    }
                }

                tx.execute(
                    "INSERT INTO appointments
                         (id, clinic_id, veterinarian_id, client_name, client_phone,
                          pet_name, start_time, end_time, status, origin, external_event_id)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'scheduled', ?9, ?10)",
                    params![
                        id.to_string(),
                        request.clinic_id.to_string(),
                        request.veterinarian_id.to_string(),
                        request.client_name,
                        request.client_phone,
                        request.pet_name,
                        format_instant(request.start_time),
                        format_instant(request.end_time),
                        request.origin.as_str(),
                        request.external_event_id,
                    ],
                )
                .map_err(StoreError::from)?;

                fetch_details(tx, id).map_err(SchedulingError::from)
            })
            .await?;

        info!("Appointment booked: {}", details.appointment.id);
        Ok(details)
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<AppointmentDetails, SchedulingError> {
        self.store
            .read(|conn| fetch_details(conn, appointment_id))
            .await
            .map_err(SchedulingError::from)
    }

    /// List appointments with filters, newest first.
    pub async fn search_appointments(
        &self,
        query: AppointmentSearchQuery,
    ) -> Result<AppointmentListResponse, SchedulingError> {
        debug!("Listing appointments with filters");

        self.store
            .read(|conn| {
                let mut clauses: Vec<&'static str> = Vec::new();
                let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

                if let Some(clinic_id) = query.clinic_id {
                    clauses.push("a.clinic_id = ?");
                    values.push(Box::new(clinic_id.to_string()));
                }
                if let Some(veterinarian_id) = query.veterinarian_id {
                    clauses.push("a.veterinarian_id = ?");
                    values.push(Box::new(veterinarian_id.to_string()));
                }
                if let Some(status) = query.status {
                    clauses.push("a.status = ?");
                    values.push(Box::new(status.as_str()));
                }
                if let Some(origin) = query.origin {
                    clauses.push("a.origin = ?");
                    values.push(Box::new(origin.as_str()));
                }
                if let Some(from) = query.from {
                    clauses.push("a.start_time >= ?");
                    values.push(Box::new(format_instant(from)));
                }
                if let Some(to) = query.to {
                    clauses.push("a.end_time <= ?");
                    values.push(Box::new(format_instant(to)));
                }

                let where_clause = if clauses.is_empty() {
                    String::new()
                } else {
                    format!(" WHERE {}", clauses.join(" AND "))
                };

                let refs: Vec<&dyn rusqlite::types::ToSql> =
                    values.iter().map(|v| v.as_ref()).collect();

                let total: i64 = conn.query_row(
                    &format!("SELECT COUNT(*) FROM appointments a{where_clause}"),
                    refs.as_slice(),
                    |row| row.get(0),
                )?;

                let limit = query.limit.unwrap_or(100).clamp(1, 500);
                let offset = query.offset.unwrap_or(0).max(0);
                let sql = format!(
                    "SELECT {DETAIL_COLUMNS} {DETAIL_JOIN}{where_clause} \
                     ORDER BY a.start_time DESC LIMIT {limit} OFFSET {offset}"
                );

                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(refs.as_slice(), details_from_row)?;
                let appointments = rows
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(StoreError::from)?;

                Ok(AppointmentListResponse {
                    appointments,
                    total,
                })
            })
            .await
            .map_err(|e: StoreError| SchedulingError::from(e))
    }

    /// Partial update of appointment fields. Any change to the time range
    /// re-runs the availability check, excluding the appointment's own row.
    pub async fn update_appointment(
        &self,
        appointment_id: Uuid,
        request: UpdateAppointmentRequest,
    ) -> Result<AppointmentDetails, SchedulingError> {
        debug!("Updating appointment {}", appointment_id);

        self.store
            .write(|tx| {
                let current = fetch_appointment(tx, appointment_id)?;

                let start_time = request.start_time.unwrap_or(current.start_time);
                let end_time = request.end_time.unwrap_or(current.end_time);
                let range_changed =
                    start_time != current.start_time || end_time != current.end_time;

                if range_changed {
                    validate_range_for(tx, &current, start_time, end_time)?;
                }

                let client_name = request.client_name.clone().unwrap_or(current.client_name);
                let client_phone = request.client_phone.clone().or(current.client_phone);
                let pet_name = request.pet_name.clone().unwrap_or(current.pet_name);
                let origin = request.origin.unwrap_or(current.origin);
                let external_event_id = request
                    .external_event_id
                    .clone()
                    .or(current.external_event_id);

                tx.execute(
                    "UPDATE appointments
                     SET client_name = ?1, client_phone = ?2, pet_name = ?3,
                         start_time = ?4, end_time = ?5, origin = ?6, external_event_id = ?7
                     WHERE id = ?8",
                    params![
                        client_name,
                        client_phone,
                        pet_name,
                        format_instant(start_time),
                        format_instant(end_time),
                        origin.as_str(),
                        external_event_id,
                        appointment_id.to_string(),
                    ],
                )
                .map_err(StoreError::from)?;

                fetch_details(tx, appointment_id).map_err(SchedulingError::from)
            })
            .await
    }

    pub async fn update_status(
        &self,
        appointment_id: Uuid,
        new_status: AppointmentStatus,
    ) -> Result<AppointmentDetails, SchedulingError> {
        debug!("Updating appointment {} status to {}", appointment_id, new_status);

        let details = self
            .store
            .write(|tx| {
                let current = fetch_appointment(tx, appointment_id)?;
                self.lifecycle
                    .validate_status_transition(current.status, new_status)?;

                tx.execute(
                    "UPDATE appointments SET status = ?1 WHERE id = ?2",
                    params![new_status.as_str(), appointment_id.to_string()],
                )
                .map_err(StoreError::from)?;

                fetch_details(tx, appointment_id).map_err(SchedulingError::from)
            })
            .await?;

        info!(
            "Appointment {} is now {}",
            appointment_id, details.appointment.status
        );
        Ok(details)
    }

    /// Cancel an appointment. The slot becomes immediately reusable:
    /// cancelled rows are excluded from overlap checks.
    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<AppointmentDetails, SchedulingError> {
        self.update_status(appointment_id, AppointmentStatus::Cancelled)
            .await
    }

    /// Move an appointment to a new range, keeping everything else.
    pub async fn reschedule_appointment(
        &self,
        appointment_id: Uuid,
        request: RescheduleAppointmentRequest,
    ) -> Result<AppointmentDetails, SchedulingError> {
        debug!(
            "Rescheduling appointment {} to {} - {}",
            appointment_id, request.new_start_time, request.new_end_time
        );

        self.store
            .write(|tx| {
                let current = fetch_appointment(tx, appointment_id)?;
                validate_range_for(tx, &current, request.new_start_time, request.new_end_time)?;

                tx.execute(
                    "UPDATE appointments SET start_time = ?1, end_time = ?2 WHERE id = ?3",
                    params![
                        format_instant(request.new_start_time),
                        format_instant(request.new_end_time),
                        appointment_id.to_string(),
                    ],
                )
                .map_err(StoreError::from)?;

                fetch_details(tx, appointment_id).map_err(SchedulingError::from)
            })
            .await
    }

    /// The booked slots of one veterinarian on one date, earliest first.
    pub async fn day_occupancy(
        &self,
        veterinarian_id: Uuid,
        date: NaiveDate,
    ) -> Result<DayOccupancy, SchedulingError> {
        let day_start = date.and_hms_opt(0, 0, 0).unwrap().and_utc();
        let day_end = day_start + Duration::days(1);

        self.store
            .read(|conn| {
                ensure_veterinarian_exists(conn, veterinarian_id)?;

                let mut stmt = conn.prepare(
                    "SELECT start_time, end_time, status FROM appointments
                     WHERE veterinarian_id = ?1
                       AND status <> 'cancelled'
                       AND start_time >= ?2 AND start_time < ?3
                     ORDER BY start_time ASC",
                )?;
                let rows = stmt.query_map(
                    params![
                        veterinarian_id.to_string(),
                        format_instant(day_start),
                        format_instant(day_end),
                    ],
                    |row| {
                        let raw_status: String = row.get(2)?;
                        let status = AppointmentStatus::parse(&raw_status).map_err(|e| {
                            rusqlite::Error::FromSqlConversionFailure(
                                2,
                                rusqlite::types::Type::Text,
                                Box::new(e),
                            )
                        })?;
                        Ok(OccupiedSlot {
                            start_time: instant_column(row, 0)?,
                            end_time: instant_column(row, 1)?,
                            status,
                        })
                    },
                )?;
                let occupied = rows
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(StoreError::from)?;

                Ok(DayOccupancy {
                    veterinarian_id,
                    date,
                    occupied,
                })
            })
            .await
            .map_err(|e: StoreError| SchedulingError::from(e))
    }
}

/// Range validation shared by update and reschedule: the appointment must
/// still occupy its slot, the new range must be well-formed, and the
/// availability check runs with the appointment's own row excluded.
fn validate_range_for(
    conn: &Connection,
    current: &Appointment,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
) -> Result<(), SchedulingError> {
    if !current.status.occupies_slot() {
        return Err(SchedulingError::NotModifiable(current.status));
    }
    if end_time <= start_time {
        return Err(SchedulingError::InvalidRange);
    }
    match check_availability(
        conn,
        current.clinic_id,
        current.veterinarian_id,
        start_time,
        end_time,
        Some(current.id),
    )? {
        AvailabilityDecision::Available => Ok(()),
        AvailabilityDecision::Unavailable(reason) => Err(reason.into()),
    }
}

fn ensure_clinic_exists(conn: &Connection, clinic_id: Uuid) -> Result<(), StoreError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM clinics WHERE id = ?1",
        params![clinic_id.to_string()],
        |row| row.get(0),
    )?;
    if count == 0 {
        return Err(StoreError::NotFound {
            entity: "clinic",
            id: clinic_id.to_string(),
        });
    }
    Ok(())
}

fn ensure_veterinarian_exists(conn: &Connection, veterinarian_id: Uuid) -> Result<(), StoreError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM veterinarians WHERE id = ?1",
        params![veterinarian_id.to_string()],
        |row| row.get(0),
    )?;
    if count == 0 {
        return Err(StoreError::NotFound {
            entity: "veterinarian",
            id: veterinarian_id.to_string(),
        });
    }
    Ok(())
}

fn ensure_veterinarian_in_clinic(
    conn: &Connection,
    veterinarian_id: Uuid,
    clinic_id: Uuid,
) -> Result<(), SchedulingError> {
    let owner: Option<String> = conn
        .query_row(
            "SELECT clinic_id FROM veterinarians WHERE id = ?1",
            params![veterinarian_id.to_string()],
            |row| row.get(0),
        )
        .optional()
        .map_err(StoreError::from)?;

    match owner {
        None => Err(SchedulingError::Store(StoreError::NotFound {
            entity: "veterinarian",
            id: veterinarian_id.to_string(),
        })),
        Some(owner) if owner != clinic_id.to_string() => {
            Err(SchedulingError::VeterinarianNotInClinic {
                veterinarian_id,
                clinic_id,
            })
        }
        Some(_) => Ok(()),
    }
}

fn fetch_appointment(conn: &Connection, id: Uuid) -> Result<Appointment, StoreError> {
    conn.query_row(
        "SELECT id, clinic_id, veterinarian_id, client_name, client_phone, pet_name,
                start_time, end_time, status, origin, external_event_id,
                created_at, updated_at
         FROM appointments WHERE id = ?1",
        params![id.to_string()],
        appointment_from_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound {
            entity: "appointment",
            id: id.to_string(),
        },
        other => other.into(),
    })
}

fn fetch_details(conn: &Connection, id: Uuid) -> Result<AppointmentDetails, StoreError> {
    conn.query_row(
        &format!("SELECT {DETAIL_COLUMNS} {DETAIL_JOIN} WHERE a.id = ?1"),
        params![id.to_string()],
        details_from_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound {
            entity: "appointment",
            id: id.to_string(),
        },
        other => other.into(),
    })
}

fn appointment_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Appointment> {
    let raw_status: String = row.get(8)?;
    let status = AppointmentStatus::parse(&raw_status).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(8, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let raw_origin: String = row.get(9)?;
    let origin = AppointmentOrigin::parse(&raw_origin).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(9, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Appointment {
        id: uuid_column(row, 0)?,
        clinic_id: uuid_column(row, 1)?,
        veterinarian_id: uuid_column(row, 2)?,
        client_name: row.get(3)?,
        client_phone: row.get(4)?,
        pet_name: row.get(5)?,
        start_time: instant_column(row, 6)?,
        end_time: instant_column(row, 7)?,
        status,
        origin,
        external_event_id: row.get(10)?,
        created_at: instant_column(row, 11)?,
        updated_at: instant_column(row, 12)?,
    })
}

fn details_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AppointmentDetails> {
    Ok(AppointmentDetails {
        appointment: appointment_from_row(row)?,
        veterinarian_name: row.get(13)?,
        clinic_name: row.get(14)?,
    })
}
