use thiserror::Error;

// Extended result codes, per the SQLite C API.
const SQLITE_CONSTRAINT_PRIMARYKEY: i32 = 1555;
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(String),

    #[error("{entity} with id '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("unique constraint violated: {0}")]
    DuplicateUnique(String),

    #[error("constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("{entity} is still referenced by {blocking} dependent row(s)")]
    ReferentialIntegrityViolation { entity: &'static str, blocking: i64 },

    #[error("storage busy, transaction conflict")]
    Conflict,

    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("invalid stored value for {field}: {value}")]
    InvalidStored { field: &'static str, value: String },
}

/// Errors that may succeed when the whole transaction is retried.
pub trait Transient {
    fn is_transient(&self) -> bool;
}

impl Transient for StoreError {
    fn is_transient(&self) -> bool {
        matches!(self, StoreError::Conflict)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, msg) => match e.code {
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked => {
                    StoreError::Conflict
                }
                rusqlite::ErrorCode::ConstraintViolation => {
                    let detail = msg
                        .clone()
                        .unwrap_or_else(|| "constraint violation".to_string());
                    if e.extended_code == SQLITE_CONSTRAINT_UNIQUE
                        || e.extended_code == SQLITE_CONSTRAINT_PRIMARYKEY
                    {
                        StoreError::DuplicateUnique(detail)
                    } else {
                        StoreError::ConstraintViolation(detail)
                    }
                }
                _ => StoreError::Sqlite(err.to_string()),
            },
            _ => StoreError::Sqlite(err.to_string()),
        }
    }
}
