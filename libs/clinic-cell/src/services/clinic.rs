use std::sync::Arc;

use rusqlite::{params, Connection};
use tracing::{debug, info};
use uuid::Uuid;

use shared_store::columns::{instant_column, json_column, uuid_column};
use shared_store::{delete_entity, Entity, Store, StoreError};

use crate::models::{Clinic, ClinicError, CreateClinicRequest, UpdateClinicRequest};

const CLINIC_COLUMNS: &str =
    "id, name, address, settings, is_active, created_at, updated_at";

pub struct ClinicService {
    store: Arc<Store>,
}

impl ClinicService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub async fn create_clinic(&self, request: CreateClinicRequest) -> Result<Clinic, ClinicError> {
        debug!("Creating clinic: {}", request.name);

        if request.name.trim().len() < 3 {
            return Err(ClinicError::ValidationError(
                "clinic name must have at least 3 characters".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        let settings = request.settings.unwrap_or_else(|| serde_json::json!({}));

        let clinic = self
            .store
            .write(|tx| {
                tx.execute(
                    "INSERT INTO clinics (id, name, address, settings, is_active)
                     VALUES (?1, ?2, ?3, ?4, 1)",
                    params![
                        id.to_string(),
                        request.name,
                        request.address,
                        settings.to_string(),
                    ],
                )
                .map_err(StoreError::from)?;
                fetch_clinic(tx, &id.to_string()).map_err(ClinicError::from)
            })
            .await?;

        info!("Clinic created: {} ({})", clinic.name, clinic.id);
        Ok(clinic)
    }

    /// List active clinics.
    pub async fn list_clinics(&self) -> Result<Vec<Clinic>, ClinicError> {
        self.store
            .read(|conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {CLINIC_COLUMNS} FROM clinics WHERE is_active = 1 ORDER BY name"
                ))?;
                let rows = stmt.query_map([], clinic_from_row)?;
                rows.collect::<Result<Vec<_>, _>>()
                    .map_err(StoreError::from)
            })
            .await
            .map_err(ClinicError::from)
    }

    pub async fn get_clinic(&self, clinic_id: Uuid) -> Result<Clinic, ClinicError> {
        self.store
            .read(|conn| fetch_clinic(conn, &clinic_id.to_string()))
            .await
            .map_err(ClinicError::from)
    }

    pub async fn update_clinic(
        &self,
        clinic_id: Uuid,
        request: UpdateClinicRequest,
    ) -> Result<Clinic, ClinicError> {
        debug!("Updating clinic {}", clinic_id);

        if let Some(name) = &request.name {
            if name.trim().len() < 3 {
                return Err(ClinicError::ValidationError(
                    "clinic name must have at least 3 characters".to_string(),
                ));
            }
        }

        let id = clinic_id.to_string();
        self.store
            .write(move |tx| {
                let current = fetch_clinic(tx, &id)?;
                let name = request.name.clone().unwrap_or(current.name);
                let address = request.address.clone().or(current.address);
                let settings = request.settings.clone().unwrap_or(current.settings);
                let is_active = request.is_active.unwrap_or(current.is_active);

                tx.execute(
                    "UPDATE clinics SET name = ?1, address = ?2, settings = ?3, is_active = ?4
                     WHERE id = ?5",
                    params![name, address, settings.to_string(), is_active, id],
                )
                .map_err(StoreError::from)?;
                fetch_clinic(tx, &id).map_err(ClinicError::from)
            })
            .await
    }

    /// Soft-delete: the clinic stays queryable by id but drops out of listings.
    pub async fn deactivate_clinic(&self, clinic_id: Uuid) -> Result<Clinic, ClinicError> {
        let id = clinic_id.to_string();
        self.store
            .write(move |tx| {
                let changed = tx
                    .execute("UPDATE clinics SET is_active = 0 WHERE id = ?1", params![id])
                    .map_err(StoreError::from)?;
                if changed == 0 {
                    return Err(ClinicError::Store(StoreError::NotFound {
                        entity: "clinic",
                        id: id.clone(),
                    }));
                }
                fetch_clinic(tx, &id).map_err(ClinicError::from)
            })
            .await
    }

    /// Hard delete; cascades to everything the clinic owns.
    pub async fn delete_clinic(&self, clinic_id: Uuid) -> Result<(), ClinicError> {
        let id = clinic_id.to_string();
        self.store
            .write(move |tx| delete_entity(tx, Entity::Clinic, &id).map_err(ClinicError::from))
            .await
    }
}

pub(crate) fn fetch_clinic(conn: &Connection, id: &str) -> Result<Clinic, StoreError> {
    conn.query_row(
        &format!("SELECT {CLINIC_COLUMNS} FROM clinics WHERE id = ?1"),
        params![id],
        clinic_from_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound {
            entity: "clinic",
            id: id.to_string(),
        },
        other => other.into(),
    })
}

fn clinic_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Clinic> {
    Ok(Clinic {
        id: uuid_column(row, 0)?,
        name: row.get(1)?,
        address: row.get(2)?,
        settings: json_column(row, 3)?,
        is_active: row.get(4)?,
        created_at: instant_column(row, 5)?,
        updated_at: instant_column(row, 6)?,
    })
}
