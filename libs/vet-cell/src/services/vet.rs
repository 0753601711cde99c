use std::sync::Arc;

use rusqlite::{params, Connection};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_store::columns::{instant_column, uuid_column};
use shared_store::{delete_entity, Entity, Store, StoreError};

use crate::models::{
    CreateVeterinarianRequest, UpdateVeterinarianRequest, VetError, Veterinarian,
};

const VET_COLUMNS: &str =
    "id, clinic_id, name, email, specialty, is_active, created_at, updated_at";

pub struct VeterinarianService {
    store: Arc<Store>,
}

impl VeterinarianService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub async fn create_veterinarian(
        &self,
        request: CreateVeterinarianRequest,
    ) -> Result<Veterinarian, VetError> {
        debug!("Creating veterinarian: {}", request.email);

        if request.name.trim().is_empty() {
            return Err(VetError::ValidationError(
                "veterinarian name must not be empty".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        let vet = self
            .store
            .write(|tx| {
                ensure_clinic_exists(tx, &request.clinic_id.to_string())?;
                tx.execute(
                    "INSERT INTO veterinarians (id, clinic_id, name, email, specialty, is_active)
                     VALUES (?1, ?2, ?3, ?4, ?5, 1)",
                    params![
                        id.to_string(),
                        request.clinic_id.to_string(),
                        request.name,
                        request.email,
                        request.specialty,
                    ],
                )
                .map_err(StoreError::from)?;
                fetch_veterinarian(tx, &id.to_string()).map_err(VetError::from)
            })
            .await?;

        info!("Veterinarian created: {} ({})", vet.email, vet.id);
        Ok(vet)
    }

    pub async fn get_veterinarian(&self, vet_id: Uuid) -> Result<Veterinarian, VetError> {
        self.store
            .read(|conn| fetch_veterinarian(conn, &vet_id.to_string()))
            .await
            .map_err(VetError::from)
    }

    pub async fn list_veterinarians_by_clinic(
        &self,
        clinic_id: Uuid,
    ) -> Result<Vec<Veterinarian>, VetError> {
        self.store
            .read(|conn| {
                ensure_clinic_exists(conn, &clinic_id.to_string())?;
                let mut stmt = conn.prepare(&format!(
                    "SELECT {VET_COLUMNS} FROM veterinarians
                     WHERE clinic_id = ?1 ORDER BY name"
                ))?;
                let rows = stmt.query_map(params![clinic_id.to_string()], vet_from_row)?;
                rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
            })
            .await
            .map_err(VetError::from)
    }

    pub async fn update_veterinarian(
        &self,
        vet_id: Uuid,
        request: UpdateVeterinarianRequest,
    ) -> Result<Veterinarian, VetError> {
        debug!("Updating veterinarian {}", vet_id);

        let id = vet_id.to_string();
        self.store
            .write(move |tx| {
                let current = fetch_veterinarian(tx, &id)?;
                let name = request.name.clone().unwrap_or(current.name);
                let email = request.email.clone().unwrap_or(current.email);
                let specialty = request.specialty.clone().or(current.specialty);
                let is_active = request.is_active.unwrap_or(current.is_active);

                tx.execute(
                    "UPDATE veterinarians SET name = ?1, email = ?2, specialty = ?3, is_active = ?4
                     WHERE id = ?5",
                    params![name, email, specialty, is_active, id],
                )
                .map_err(StoreError::from)?;
                fetch_veterinarian(tx, &id).map_err(VetError::from)
            })
            .await
    }

    pub async fn deactivate_veterinarian(&self, vet_id: Uuid) -> Result<Veterinarian, VetError> {
        let id = vet_id.to_string();
        self.store
            .write(move |tx| {
                let changed = tx
                    .execute(
                        "UPDATE veterinarians SET is_active = 0 WHERE id = ?1",
                        params![id],
                    )
                    .map_err(StoreError::from)?;
                if changed == 0 {
                    return Err(VetError::Store(StoreError::NotFound {
                        entity: "veterinarian",
                        id: id.clone(),
                    }));
                }
                fetch_veterinarian(tx, &id).map_err(VetError::from)
            })
            .await
    }

    /// Hard delete. Restricted while appointments still reference the
    /// veterinarian; the caller must cancel or reassign them first.
    pub async fn delete_veterinarian(&self, vet_id: Uuid) -> Result<(), VetError> {
        let id = vet_id.to_string();
        let result = self
            .store
            .write(move |tx| {
                delete_entity(tx, Entity::Veterinarian, &id).map_err(VetError::from)
            })
            .await;

        if let Err(VetError::Store(StoreError::ReferentialIntegrityViolation {
            blocking, ..
        })) = &result
        {
            warn!(
                "Refused to delete veterinarian {}: {} appointment(s) still attached",
                vet_id, blocking
            );
        }
        result
    }
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

fn fetch_veterinarian(conn: &Connection, id: &str) -> Result<Veterinarian, StoreError> {
    conn.query_row(
        &format!("SELECT {VET_COLUMNS} FROM veterinarians WHERE id = ?1"),
        params![id],
        vet_from_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound {
            entity: "veterinarian",
            id: id.to_string(),
        },
        other => other.into(),
    })
}

fn vet_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Veterinarian> {
    Ok(Veterinarian {
        id: uuid_column(row, 0)?,
        clinic_id: uuid_column(row, 1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        specialty: row.get(4)?,
        is_active: row.get(5)?,
        created_at: instant_column(row, 6)?,
        updated_at: instant_column(row, 7)?,
    })
}
