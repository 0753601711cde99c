use std::sync::Arc;

use rusqlite::{params, Connection};
use tracing::{debug, info};
use uuid::Uuid;

use shared_store::columns::{instant_column, uuid_column};
use shared_store::time::parse_hhmm;
use shared_store::{delete_entity, Entity, Store, StoreError};

use crate::models::{
    ClinicError, CreateOperatingHoursRequest, OperatingHours, UpdateOperatingHoursRequest,
};

const HOURS_COLUMNS: &str =
    "id, clinic_id, weekday, opens_at, closes_at, created_at, updated_at";

pub struct OperatingHoursService {
    store: Arc<Store>,
}

impl OperatingHoursService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub async fn create_hours(
        &self,
        clinic_id: Uuid,
        request: CreateOperatingHoursRequest,
    ) -> Result<OperatingHours, ClinicError> {
        debug!(
            "Creating operating hours for clinic {} weekday {}",
            clinic_id, request.weekday
        );

        let (opens_at, closes_at) =
            validate_window(request.weekday, &request.opens_at, &request.closes_at)?;

        let id = Uuid::new_v4();
        let hours = self
            .store
            .write(|tx| {
                ensure_clinic_exists(tx, &clinic_id.to_string())?;
                tx.execute(
                    "INSERT INTO operating_hours (id, clinic_id, weekday, opens_at, closes_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        id.to_string(),
                        clinic_id.to_string(),
                        request.weekday,
                        opens_at,
                        closes_at,
                    ],
                )
                .map_err(StoreError::from)?;
                fetch_hours(tx, &id.to_string()).map_err(ClinicError::from)
            })
            .await?;

        info!("Operating hours created: {} (clinic {})", hours.id, clinic_id);
        Ok(hours)
    }

    /// All windows of one clinic, Sunday first.
    pub async fn list_hours(&self, clinic_id: Uuid) -> Result<Vec<OperatingHours>, ClinicError> {
        self.store
            .read(|conn| {
                ensure_clinic_exists(conn, &clinic_id.to_string())?;
                let mut stmt = conn.prepare(&format!(
                    "SELECT {HOURS_COLUMNS} FROM operating_hours
                     WHERE clinic_id = ?1 ORDER BY weekday"
                ))?;
                let rows =
                    stmt.query_map(params![clinic_id.to_string()], hours_from_row)?;
                rows.collect::<Result<Vec<_>, _>>()
                    .map_err(StoreError::from)
            })
            .await
            .map_err(ClinicError::from)
    }

    pub async fn get_hours(&self, hours_id: Uuid) -> Result<OperatingHours, ClinicError> {
        self.store
            .read(|conn| fetch_hours(conn, &hours_id.to_string()))
            .await
            .map_err(ClinicError::from)
    }

    pub async fn update_hours(
        &self,
        hours_id: Uuid,
        request: UpdateOperatingHoursRequest,
    ) -> Result<OperatingHours, ClinicError> {
        debug!("Updating operating hours {}", hours_id);

        let id = hours_id.to_string();
        self.store
            .write(move |tx| {
                let current = fetch_hours(tx, &id)?;
                let weekday = request.weekday.unwrap_or(current.weekday);
                let opens_at = request.opens_at.clone().unwrap_or(current.opens_at);
                let closes_at = request.closes_at.clone().unwrap_or(current.closes_at);
                let (opens_at, closes_at) = validate_window(weekday, &opens_at, &closes_at)?;

                tx.execute(
                    "UPDATE operating_hours SET weekday = ?1, opens_at = ?2, closes_at = ?3
                     WHERE id = ?4",
                    params![weekday, opens_at, closes_at, id],
                )
                .map_err(StoreError::from)?;
                fetch_hours(tx, &id).map_err(ClinicError::from)
            })
            .await
    }

    pub async fn delete_hours(&self, hours_id: Uuid) -> Result<(), ClinicError> {
        let id = hours_id.to_string();
        self.store
            .write(move |tx| {
                delete_entity(tx, Entity::OperatingHours, &id).map_err(ClinicError::from)
            })
            .await
    }
}

/// Normalize and validate one opening window. Returns zero-padded "HH:MM"
/// strings so stored values order lexicographically.
fn validate_window(
    weekday: u8,
    opens_at: &str,
    closes_at: &str,
) -> Result<(String, String), ClinicError> {
    if weekday > 6 {
        return Err(ClinicError::InvalidWeekday);
    }
    let opens = parse_hhmm(opens_at).map_err(|_| ClinicError::InvalidHours)?;
    let closes = parse_hhmm(closes_at).map_err(|_| ClinicError::InvalidHours)?;
    if opens >= closes {
        return Err(ClinicError::InvalidHours);
    }
    Ok((
        opens.format("%H:%M").to_string(),
        closes.format("%H:%M").to_string(),
    ))
}

fn ensure_clinic_exists(conn: &Connection, clinic_id: &str) -> Result<(), StoreError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM clinics WHERE id = ?1",
        params![clinic_id],
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

fn fetch_hours(conn: &Connection, id: &str) -> Result<OperatingHours, StoreError> {
    conn.query_row(
        &format!("SELECT {HOURS_COLUMNS} FROM operating_hours WHERE id = ?1"),
        params![id],
        hours_from_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound {
            entity: "operating hours",
            id: id.to_string(),
        },
        other => other.into(),
    })
}

fn hours_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<OperatingHours> {
    Ok(OperatingHours {
        id: uuid_column(row, 0)?,
        clinic_id: uuid_column(row, 1)?,
        weekday: row.get(2)?,
        opens_at: row.get(3)?,
        closes_at: row.get(4)?,
        created_at: instant_column(row, 5)?,
        updated_at: instant_column(row, 6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_normalizes_and_validates() {
        let (opens, closes) = validate_window(1, "9:00", "17:30").unwrap();
        assert_eq!(opens, "09:00");
        assert_eq!(closes, "17:30");

        assert!(matches!(
            validate_window(7, "09:00", "17:00"),
            Err(ClinicError::InvalidWeekday)
        ));
        assert!(matches!(
            validate_window(1, "17:00", "09:00"),
            Err(ClinicError::InvalidHours)
        ));
        assert!(matches!(
            validate_window(1, "siesta", "17:00"),
            Err(ClinicError::InvalidHours)
        ));
    }
}
