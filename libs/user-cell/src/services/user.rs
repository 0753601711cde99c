use std::sync::Arc;

use rusqlite::{params, Connection};
use tracing::{debug, info};
use uuid::Uuid;

use shared_store::columns::{instant_column, uuid_column};
use shared_store::{delete_entity, Entity, Store, StoreError};

use crate::models::{CreateUserRequest, UpdateUserRequest, User, UserError, UserRole};

const USER_COLUMNS: &str =
    "id, clinic_id, name, email, role, is_active, created_at, updated_at";

pub struct UserService {
    store: Arc<Store>,
}

impl UserService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> Result<User, UserError> {
        debug!("Creating user: {}", request.email);

        if request.name.trim().is_empty() {
            return Err(UserError::ValidationError("user name must not be empty".to_string()));
        }

        let id = Uuid::new_v4();
        let user = self
            .store
            .write(|tx| {
                ensure_clinic_exists(tx, &request.clinic_id.to_string())?;
                tx.execute(
                    "INSERT INTO users (id, clinic_id, name, email, role, is_active)
                     VALUES (?1, ?2, ?3, ?4, ?5, 1)",
                    params![
                        id.to_string(),
                        request.clinic_id.to_string(),
                        request.name,
                        request.email,
                        request.role.as_str(),
                    ],
                )
                .map_err(StoreError::from)?;
                fetch_user(tx, &id.to_string()).map_err(UserError::from)
            })
            .await?;

        info!("User created: {} ({})", user.email, user.id);
        Ok(user)
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<User, UserError> {
        self.store
            .read(|conn| fetch_user(conn, &user_id.to_string()))
            .await
            .map_err(UserError::from)
    }

    pub async fn list_users_by_clinic(&self, clinic_id: Uuid) -> Result<Vec<User>, UserError> {
        self.store
            .read(|conn| {
                ensure_clinic_exists(conn, &clinic_id.to_string())?;
                let mut stmt = conn.prepare(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE clinic_id = ?1 ORDER BY name"
                ))?;
                let rows = stmt.query_map(params![clinic_id.to_string()], user_from_row)?;
                rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
            })
            .await
            .map_err(UserError::from)
    }

    pub async fn update_user(
        &self,
        user_id: Uuid,
        request: UpdateUserRequest,
    ) -> Result<User, UserError> {
        debug!("Updating user {}", user_id);

        let id = user_id.to_string();
        self.store
            .write(move |tx| {
                let current = fetch_user(tx, &id)?;
                let name = request.name.clone().unwrap_or(current.name);
                let email = request.email.clone().unwrap_or(current.email);
                let role = request.role.unwrap_or(current.role);
                let is_active = request.is_active.unwrap_or(current.is_active);

                tx.execute(
                    "UPDATE users SET name = ?1, email = ?2, role = ?3, is_active = ?4
                     WHERE id = ?5",
                    params![name, email, role.as_str(), is_active, id],
                )
                .map_err(StoreError::from)?;
                fetch_user(tx, &id).map_err(UserError::from)
            })
            .await
    }

    pub async fn deactivate_user(&self, user_id: Uuid) -> Result<User, UserError> {
        let id = user_id.to_string();
        self.store
            .write(move |tx| {
                let changed = tx
                    .execute("UPDATE users SET is_active = 0 WHERE id = ?1", params![id])
                    .map_err(StoreError::from)?;
                if changed == 0 {
                    return Err(UserError::Store(StoreError::NotFound {
                        entity: "user",
                        id: id.clone(),
                    }));
                }
                fetch_user(tx, &id).map_err(UserError::from)
            })
            .await
    }

    pub async fn delete_user(&self, user_id: Uuid) -> Result<(), UserError> {
        let id = user_id.to_string();
        self.store
            .write(move |tx| delete_entity(tx, Entity::User, &id).map_err(UserError::from))
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

fn fetch_user(conn: &Connection, id: &str) -> Result<User, StoreError> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
        params![id],
        user_from_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound {
            entity: "user",
            id: id.to_string(),
        },
        other => other.into(),
    })
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let raw_role: String = row.get(4)?;
    let role = UserRole::parse(&raw_role).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(User {
        id: uuid_column(row, 0)?,
        clinic_id: uuid_column(row, 1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        role,
        is_active: row.get(5)?,
        created_at: instant_column(row, 6)?,
        updated_at: instant_column(row, 7)?,
    })
}
