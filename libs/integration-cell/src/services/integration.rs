use std::sync::Arc;

use rusqlite::{params, Connection};
use tracing::{debug, info};
use uuid::Uuid;

use shared_store::columns::{instant_column, json_column, uuid_column};
use shared_store::{delete_entity, Entity, Store, StoreError};

use crate::models::{
    CreateIntegrationRequest, Integration, IntegrationError, ServiceKind,
    UpdateIntegrationRequest,
};

const INTEGRATION_COLUMNS: &str =
    "id, clinic_id, service_kind, credentials, is_active, created_at, updated_at";

pub struct IntegrationService {
    store: Arc<Store>,
}

impl IntegrationService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub async fn create_integration(
        &self,
        request: CreateIntegrationRequest,
    ) -> Result<Integration, IntegrationError> {
        debug!(
            "Creating {} integration for clinic {}",
            request.service_kind, request.clinic_id
        );

        let id = Uuid::new_v4();
        let integration = self
            .store
            .write(|tx| {
                ensure_clinic_exists(tx, &request.clinic_id.to_string())?;
                tx.execute(
                    "INSERT INTO integrations (id, clinic_id, service_kind, credentials, is_active)
                     VALUES (?1, ?2, ?3, ?4, 1)",
                    params![
                        id.to_string(),
                        request.clinic_id.to_string(),
                        request.service_kind.as_str(),
                        request.credentials.to_string(),
                    ],
                )
                .map_err(StoreError::from)?;
                fetch_integration(tx, &id.to_string()).map_err(IntegrationError::from)
            })
            .await?;

        info!("Integration created: {} ({})", integration.service_kind, integration.id);
        Ok(integration)
    }

    pub async fn get_integration(
        &self,
        integration_id: Uuid,
    ) -> Result<Integration, IntegrationError> {
        self.store
            .read(|conn| fetch_integration(conn, &integration_id.to_string()))
            .await
            .map_err(IntegrationError::from)
    }

    pub async fn list_integrations_by_clinic(
        &self,
        clinic_id: Uuid,
    ) -> Result<Vec<Integration>, IntegrationError> {
        self.store
            .read(|conn| {
                ensure_clinic_exists(conn, &clinic_id.to_string())?;
                let mut stmt = conn.prepare(&format!(
                    "SELECT {INTEGRATION_COLUMNS} FROM integrations
                     WHERE clinic_id = ?1 ORDER BY service_kind"
                ))?;
                let rows =
                    stmt.query_map(params![clinic_id.to_string()], integration_from_row)?;
                rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
            })
            .await
            .map_err(IntegrationError::from)
    }

    pub async fn update_integration(
        &self,
        integration_id: Uuid,
        request: UpdateIntegrationRequest,
    ) -> Result<Integration, IntegrationError> {
        debug!("Updating integration {}", integration_id);

        let id = integration_id.to_string();
        self.store
            .write(move |tx| {
                let current = fetch_integration(tx, &id)?;
                let service_kind = request.service_kind.unwrap_or(current.service_kind);
                let credentials = request.credentials.clone().unwrap_or(current.credentials);
                let is_active = request.is_active.unwrap_or(current.is_active);

                tx.execute(
                    "UPDATE integrations SET service_kind = ?1, credentials = ?2, is_active = ?3
                     WHERE id = ?4",
                    params![
                        service_kind.as_str(),
                        credentials.to_string(),
                        is_active,
                        id
                    ],
                )
                .map_err(StoreError::from)?;
                fetch_integration(tx, &id).map_err(IntegrationError::from)
            })
            .await
    }

    pub async fn delete_integration(&self, integration_id: Uuid) -> Result<(), IntegrationError> {
        let id = integration_id.to_string();
        self.store
            .write(move |tx| {
                delete_entity(tx, Entity::Integration, &id).map_err(IntegrationError::from)
            })
            .await
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

fn fetch_integration(conn: &Connection, id: &str) -> Result<Integration, StoreError> {
    conn.query_row(
        &format!("SELECT {INTEGRATION_COLUMNS} FROM integrations WHERE id = ?1"),
        params![id],
        integration_from_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound {
            entity: "integration",
            id: id.to_string(),
        },
        other => other.into(),
    })
}

fn integration_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Integration> {
    let raw_kind: String = row.get(2)?;
    let service_kind = ServiceKind::parse(&raw_kind).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Integration {
        id: uuid_column(row, 0)?,
        clinic_id: uuid_column(row, 1)?,
        service_kind,
        credentials: json_column(row, 3)?,
        is_active: row.get(4)?,
        created_at: instant_column(row, 5)?,
        updated_at: instant_column(row, 6)?,
    })
}
