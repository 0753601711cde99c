use std::path::Path;

use rusqlite::{Connection, Transaction, TransactionBehavior};
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::{StoreError, Transient};
use crate::sqlite;

/// Shared handle over the single SQLite connection.
///
/// Every mutation funnels through [`Store::write`], which wraps the operation
/// in one transaction spanning validation and writes. Availability checks and
/// delete-policy resolution therefore see the same snapshot they mutate.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            conn: Mutex::new(sqlite::open_database(path)?),
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self {
            conn: Mutex::new(sqlite::open_memory_database()?),
        })
    }

    /// Run a read-only operation against the connection.
    pub async fn read<T, E>(
        &self,
        op: impl FnOnce(&Connection) -> Result<T, E>,
    ) -> Result<T, E> {
        let conn = self.conn.lock().await;
        op(&conn)
    }

    /// Run a mutating operation inside a single immediate transaction.
    ///
    /// The closure may fail with a domain error; any failure rolls the
    /// transaction back, leaving stored state unchanged. Transient conflicts
    /// (busy/locked) are retried exactly once before surfacing.
    pub async fn write<T, E>(
        &self,
        mut op: impl FnMut(&Transaction<'_>) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StoreError> + Transient,
    {
        let mut conn = self.conn.lock().await;
        let mut retried = false;
        loop {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(|e| E::from(StoreError::from(e)))?;

            match op(&tx) {
                Ok(value) => match tx.commit() {
                    Ok(()) => return Ok(value),
                    Err(e) => {
                        let err = StoreError::from(e);
                        if err.is_transient() && !retried {
                            warn!("commit hit a transient conflict, retrying once");
                            retried = true;
                            continue;
                        }
                        return Err(E::from(err));
                    }
                },
                Err(e) => {
                    if e.is_transient() && !retried {
                        warn!("transaction hit a transient conflict, retrying once");
                        retried = true;
                        continue;
                    }
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_commits_on_success() {
        let store = Store::open_in_memory().unwrap();
        store
            .write(|tx| {
                tx.execute("INSERT INTO clinics (id, name) VALUES ('c1', 'North Paw')", [])
                    .map_err(StoreError::from)
            })
            .await
            .unwrap();

        let count: i64 = store
            .read(|conn| {
                conn.query_row("SELECT COUNT(*) FROM clinics", [], |row| row.get(0))
                    .map_err(StoreError::from)
            })
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn file_backed_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vetly.db");
        {
            let store = Store::open(&path).unwrap();
            store
                .write(|tx| {
                    tx.execute("INSERT INTO clinics (id, name) VALUES ('c1', 'North Paw')", [])
                        .map_err(StoreError::from)
                })
                .await
                .unwrap();
        }

        let reopened = Store::open(&path).unwrap();
        let name: String = reopened
            .read(|conn| {
                conn.query_row("SELECT name FROM clinics WHERE id = 'c1'", [], |row| {
                    row.get(0)
                })
                .map_err(StoreError::from)
            })
            .await
            .unwrap();
        assert_eq!(name, "North Paw");
    }

    #[tokio::test]
    async fn failed_write_rolls_back() {
        let store = Store::open_in_memory().unwrap();
        let result: Result<(), StoreError> = store
            .write(|tx| {
                tx.execute("INSERT INTO clinics (id, name) VALUES ('c1', 'North Paw')", [])?;
                Err(StoreError::NotFound {
                    entity: "clinic",
                    id: "c1".to_string(),
                })
            })
            .await;
        assert!(result.is_err());

        let count: i64 = store
            .read(|conn| {
                conn.query_row("SELECT COUNT(*) FROM clinics", [], |row| row.get(0))
                    .map_err(StoreError::from)
            })
            .await
            .unwrap();
        assert_eq!(count, 0, "rolled-back insert must not be visible");
    }
}
