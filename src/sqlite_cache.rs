//! Implements a SQLite backed snapshot cache.
use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use rusqlite::Connection;

use crate::{Error, cache::SnapshotCache, transaction::Transaction};

/// Stores collection snapshots in a SQLite database.
///
/// The schema is a single key-value table where each value holds one
/// complete JSON-encoded snapshot. The rest of the on-device schema is
/// owned by the host application; this cache only ever touches its own
/// table.
#[derive(Debug, Clone)]
pub struct SqliteSnapshotCache {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteSnapshotCache {
    /// Create a new cache for the SQLite `connection`, creating its table
    /// if it does not exist yet.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if the table cannot be created.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Result<Self, Error> {
        create_table(&connection.lock().unwrap())?;

        Ok(Self { connection })
    }

    /// Open (or create) the cache database at `path`.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if the database cannot be opened or its
    /// table cannot be created.
    pub fn open(path: &Path) -> Result<Self, Error> {
        let connection = Connection::open(path)?;

        Self::new(Arc::new(Mutex::new(connection)))
    }
}

fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS snapshot (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

#[async_trait]
impl SnapshotCache for SqliteSnapshotCache {
    /// Retrieve the snapshot stored under `key`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::SqlError] if there is an unexpected SQL error,
    /// - or [Error::JsonSerialization] if the stored value cannot be
    ///   decoded.
    async fn get(&self, key: &str) -> Result<Option<Vec<Transaction>>, Error> {
        let value: Option<String> = {
            let connection = self.connection.lock().unwrap();
            let result = connection
                .prepare("SELECT value FROM snapshot WHERE key = :key")?
                .query_row(&[(":key", key)], |row| row.get(0));

            match result {
                Ok(value) => Some(value),
                Err(rusqlite::Error::QueryReturnedNoRows) => None,
                Err(error) => return Err(error.into()),
            }
        };

        match value {
            Some(value) => Ok(Some(serde_json::from_str(&value)?)),
            None => Ok(None),
        }
    }

    /// Overwrite the snapshot stored under `key`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::SqlError] if there is an unexpected SQL error,
    /// - or [Error::JsonSerialization] if the snapshot cannot be encoded.
    async fn set(&self, key: &str, snapshot: &[Transaction]) -> Result<(), Error> {
        let value = serde_json::to_string(snapshot)?;

        self.connection.lock().unwrap().execute(
            "INSERT INTO snapshot (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            (key, &value),
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod sqlite_snapshot_cache_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{
        cache::{SNAPSHOT_KEY, SnapshotCache},
        transaction::{Transaction, TransactionType},
    };

    use super::SqliteSnapshotCache;

    fn get_test_cache() -> SqliteSnapshotCache {
        let connection = Connection::open_in_memory().expect("Could not open database");

        SqliteSnapshotCache::new(Arc::new(Mutex::new(connection)))
            .expect("Could not create cache")
    }

    fn snapshot() -> Vec<Transaction> {
        vec![
            Transaction {
                id: "1".to_owned(),
                kind: TransactionType::Income,
                amount: 100.0,
                category: "Salary".to_owned(),
                description: "monthly salary".to_owned(),
                date: datetime!(2024-06-01 0:00 UTC),
                currency: "USD".to_owned(),
            },
            Transaction {
                id: "2".to_owned(),
                kind: TransactionType::Expense,
                amount: 30.0,
                category: "Food".to_owned(),
                description: "groceries".to_owned(),
                date: datetime!(2024-06-02 18:30 UTC),
                currency: "USD".to_owned(),
            },
        ]
    }

    #[tokio::test]
    async fn get_returns_none_when_nothing_was_stored() {
        let cache = get_test_cache();

        let got = cache.get(SNAPSHOT_KEY).await.expect("Could not read cache");

        assert_eq!(got, None);
    }

    #[tokio::test]
    async fn stored_snapshot_is_returned_intact() {
        let cache = get_test_cache();
        let want = snapshot();

        cache
            .set(SNAPSHOT_KEY, &want)
            .await
            .expect("Could not write cache");
        let got = cache.get(SNAPSHOT_KEY).await.expect("Could not read cache");

        assert_eq!(got, Some(want));
    }

    #[tokio::test]
    async fn set_overwrites_the_previous_snapshot() {
        let cache = get_test_cache();
        let mut transactions = snapshot();

        cache
            .set(SNAPSHOT_KEY, &transactions)
            .await
            .expect("Could not write cache");

        transactions.pop();
        cache
            .set(SNAPSHOT_KEY, &transactions)
            .await
            .expect("Could not write cache");

        let got = cache.get(SNAPSHOT_KEY).await.expect("Could not read cache");
        assert_eq!(got, Some(transactions));
    }

    #[tokio::test]
    async fn snapshot_survives_reopening_the_database() {
        let directory = tempfile::tempdir().expect("Could not create temp dir");
        let path = directory.path().join("cache.db");
        let want = snapshot();

        {
            let cache = SqliteSnapshotCache::open(&path).expect("Could not open cache");
            cache
                .set(SNAPSHOT_KEY, &want)
                .await
                .expect("Could not write cache");
        }

        let cache = SqliteSnapshotCache::open(&path).expect("Could not reopen cache");
        let got = cache.get(SNAPSHOT_KEY).await.expect("Could not read cache");

        assert_eq!(got, Some(want));
    }
}
