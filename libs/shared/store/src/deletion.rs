//! Cascade/restrict delete policy.
//!
//! The dependency graph is declared here as data and resolved before any row
//! is removed. Schema foreign keys stay plain `REFERENCES`, so this module is
//! the single authority for delete ordering and can be tested against an
//! in-memory database.

use rusqlite::{params, Transaction};
use tracing::{debug, info};

use crate::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Clinic,
    OperatingHours,
    User,
    Veterinarian,
    Integration,
    Appointment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Cascade,
    Restrict,
}

#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub child: Entity,
    pub fk_column: &'static str,
    pub policy: Policy,
}

impl Entity {
    pub fn table(&self) -> &'static str {
        match self {
            Entity::Clinic => "clinics",
            Entity::OperatingHours => "operating_hours",
            Entity::User => "users",
            Entity::Veterinarian => "veterinarians",
            Entity::Integration => "integrations",
            Entity::Appointment => "appointments",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Entity::Clinic => "clinic",
            Entity::OperatingHours => "operating hours",
            Entity::User => "user",
            Entity::Veterinarian => "veterinarian",
            Entity::Integration => "integration",
            Entity::Appointment => "appointment",
        }
    }

    /// Declared children, in delete order. Appointments come before
    /// veterinarians so a clinic cascade clears the rows that would
    /// otherwise trip the veterinarian restrict edge.
    fn edges(&self) -> &'static [Edge] {
        match self {
            Entity::Clinic => &[
                Edge { child: Entity::OperatingHours, fk_column: "clinic_id", policy: Policy::Cascade },
                Edge { child: Entity::User, fk_column: "clinic_id", policy: Policy::Cascade },
                Edge { child: Entity::Integration, fk_column: "clinic_id", policy: Policy::Cascade },
                Edge { child: Entity::Appointment, fk_column: "clinic_id", policy: Policy::Cascade },
                Edge { child: Entity::Veterinarian, fk_column: "clinic_id", policy: Policy::Cascade },
            ],
            Entity::Veterinarian => &[
                Edge { child: Entity::Appointment, fk_column: "veterinarian_id", policy: Policy::Restrict },
            ],
            _ => &[],
        }
    }
}

/// Delete one row, resolving the declared cascade/restrict edges first.
pub fn delete_entity(tx: &Transaction<'_>, entity: Entity, id: &str) -> Result<(), StoreError> {
    debug!("Deleting {} {}", entity.label(), id);

    let exists: i64 = tx.query_row(
        &format!("SELECT COUNT(*) FROM {} WHERE id = ?1", entity.table()),
        params![id],
        |row| row.get(0),
    )?;
    if exists == 0 {
        return Err(StoreError::NotFound {
            entity: entity.label(),
            id: id.to_string(),
        });
    }

    // Restrict edges veto the whole delete before anything is touched.
    for edge in entity.edges().iter().filter(|e| e.policy == Policy::Restrict) {
        let blocking: i64 = tx.query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE {} = ?1",
                edge.child.table(),
                edge.fk_column
            ),
            params![id],
            |row| row.get(0),
        )?;
        if blocking > 0 {
            return Err(StoreError::ReferentialIntegrityViolation {
                entity: entity.label(),
                blocking,
            });
        }
    }

    for edge in entity.edges().iter().filter(|e| e.policy == Policy::Cascade) {
        if edge.child.edges().is_empty() {
            tx.execute(
                &format!(
                    "DELETE FROM {} WHERE {} = ?1",
                    edge.child.table(),
                    edge.fk_column
                ),
                params![id],
            )?;
        } else {
            // Children with their own policies are resolved row by row.
            let child_ids: Vec<String> = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT id FROM {} WHERE {} = ?1",
                    edge.child.table(),
                    edge.fk_column
                ))?;
                let rows = stmt.query_map(params![id], |row| row.get::<_, String>(0))?;
                rows.collect::<Result<_, _>>()?
            };
            for child_id in child_ids {
                delete_entity(tx, edge.child, &child_id)?;
            }
        }
    }

    tx.execute(
        &format!("DELETE FROM {} WHERE id = ?1", entity.table()),
        params![id],
    )?;
    info!("Deleted {} {}", entity.label(), id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use crate::StoreError;

    async fn seeded_store() -> Store {
        let store = Store::open_in_memory().unwrap();
        store
            .write(|tx| {
                tx.execute_batch(
                    "INSERT INTO clinics (id, name) VALUES ('c1', 'North Paw');
                     INSERT INTO operating_hours (id, clinic_id, weekday, opens_at, closes_at)
                         VALUES ('h1', 'c1', 1, '09:00', '17:00');
                     INSERT INTO users (id, clinic_id, name, email, role)
                         VALUES ('u1', 'c1', 'Marta', 'marta@northpaw.example', 'admin');
                     INSERT INTO veterinarians (id, clinic_id, name, email)
                         VALUES ('v1', 'c1', 'Dr. Reis', 'reis@northpaw.example');
                     INSERT INTO integrations (id, clinic_id, service_kind, credentials)
                         VALUES ('i1', 'c1', 'google_calendar', '{}');
                     INSERT INTO appointments
                         (id, clinic_id, veterinarian_id, client_name, pet_name,
                          start_time, end_time, status, origin)
                         VALUES ('a1', 'c1', 'v1', 'Ana', 'Thor',
                                 '2026-03-02T10:00:00.000Z', '2026-03-02T10:30:00.000Z',
                                 'scheduled', 'manual');",
                )
                .map_err(StoreError::from)
            })
            .await
            .unwrap();
        store
    }

    async fn count(store: &Store, table: &str) -> i64 {
        let sql = format!("SELECT COUNT(*) FROM {table}");
        store
            .read(|conn| {
                conn.query_row(&sql, [], |row| row.get(0))
                    .map_err(StoreError::from)
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn clinic_delete_cascades_to_all_descendants() {
        let store = seeded_store().await;
        store
            .write(|tx| delete_entity(tx, Entity::Clinic, "c1"))
            .await
            .unwrap();

        for table in [
            "clinics",
            "operating_hours",
            "users",
            "veterinarians",
            "integrations",
            "appointments",
        ] {
            assert_eq!(count(&store, table).await, 0, "{table} not emptied");
        }
    }

    #[tokio::test]
    async fn veterinarian_delete_is_restricted_while_appointments_exist() {
        let store = seeded_store().await;
        let result = store
            .write(|tx| delete_entity(tx, Entity::Veterinarian, "v1"))
            .await;

        match result {
            Err(StoreError::ReferentialIntegrityViolation { blocking, .. }) => {
                assert_eq!(blocking, 1)
            }
            other => panic!("expected restrict violation, got {other:?}"),
        }
        assert_eq!(count(&store, "veterinarians").await, 1);
    }

    #[tokio::test]
    async fn veterinarian_delete_succeeds_without_appointments() {
        let store = seeded_store().await;
        store
            .write(|tx| {
                tx.execute("DELETE FROM appointments WHERE veterinarian_id = 'v1'", [])
                    .map_err(StoreError::from)?;
                delete_entity(tx, Entity::Veterinarian, "v1")
            })
            .await
            .unwrap();
        assert_eq!(count(&store, "veterinarians").await, 0);
    }

    #[tokio::test]
    async fn deleting_missing_row_reports_not_found() {
        let store = seeded_store().await;
        let result = store
            .write(|tx| delete_entity(tx, Entity::Clinic, "nope"))
            .await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }
}
