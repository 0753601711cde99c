//! Decides whether a candidate time range can be booked for a veterinarian.
//!
//! Ranges are half-open `[start, end)`: back-to-back bookings share an
//! instant without overlapping. The check runs on the caller's connection so
//! booking transactions re-evaluate it against the rows they are about to
//! write, not against an earlier snapshot.

use chrono::{DateTime, Datelike, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;
use uuid::Uuid;

use shared_store::columns::uuid_column;
use shared_store::time::{format_instant, parse_hhmm};
use shared_store::StoreError;

use crate::models::{AvailabilityDecision, UnavailableReason};

/// Weekdays are stored Sunday-first: 0 = Sunday, 6 = Saturday.
fn weekday_sunday_first(instant: DateTime<Utc>) -> u8 {
    instant.weekday().num_days_from_sunday() as u8
}

pub fn check_availability(
    conn: &Connection,
    clinic_id: Uuid,
    veterinarian_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude_appointment_id: Option<Uuid>,
) -> Result<AvailabilityDecision, StoreError> {
    debug!(
        "Checking availability for veterinarian {} from {} to {}",
        veterinarian_id, start, end
    );

    // Appointments never span midnight; a range crossing the weekday
    // boundary cannot sit inside any single operating window.
    if start.date_naive() != end.date_naive() {
        return Ok(AvailabilityDecision::Unavailable(
            UnavailableReason::OutsideOperatingHours,
        ));
    }

    let weekday = weekday_sunday_first(start);
    let window: Option<(String, String)> = conn
        .query_row(
            "SELECT opens_at, closes_at FROM operating_hours
             WHERE clinic_id = ?1 AND weekday = ?2",
            params![clinic_id.to_string(), weekday],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    // No row for the weekday means the clinic is closed that day.
    let Some((opens_at, closes_at)) = window else {
        return Ok(AvailabilityDecision::Unavailable(
            UnavailableReason::OutsideOperatingHours,
        ));
    };

    let opens = parse_hhmm(&opens_at)?;
    let closes = parse_hhmm(&closes_at)?;
    if start.time() < opens || end.time() > closes {
        return Ok(AvailabilityDecision::Unavailable(
            UnavailableReason::OutsideOperatingHours,
        ));
    }

    // Half-open overlap: existing.start < end AND existing.end > start.
    // First conflict wins, ordered by (start_time, id).
    let conflict = conn
        .query_row(
            "SELECT id FROM appointments
             WHERE veterinarian_id = ?1
               AND status IN ('scheduled', 'confirmed')
               AND start_time < ?2
               AND end_time > ?3
               AND (?4 IS NULL OR id <> ?4)
             ORDER BY start_time ASC, id ASC
             LIMIT 1",
            params![
                veterinarian_id.to_string(),
                format_instant(end),
                format_instant(start),
                exclude_appointment_id.map(|id| id.to_string()),
            ],
            |row| uuid_column(row, 0),
        )
        .optional()?;

    match conflict {
        Some(existing_id) => Ok(AvailabilityDecision::Unavailable(
            UnavailableReason::OverlapsExistingAppointment(existing_id),
        )),
        None => Ok(AvailabilityDecision::Available),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn weekday_mapping_is_sunday_first() {
        // 2026-03-01 is a Sunday.
        let sunday = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(weekday_sunday_first(sunday), 0);
        let monday = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
        assert_eq!(weekday_sunday_first(monday), 1);
        let saturday = Utc.with_ymd_and_hms(2026, 3, 7, 12, 0, 0).unwrap();
        assert_eq!(weekday_sunday_first(saturday), 6);
    }
}
