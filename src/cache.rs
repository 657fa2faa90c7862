//! Defines the local snapshot cache trait.

use async_trait::async_trait;

use crate::{Error, transaction::Transaction};

/// The fixed key the whole transaction snapshot is stored under.
pub const SNAPSHOT_KEY: &str = "transactions";

/// Persists full snapshots of the transaction collection between runs.
///
/// The cache is only ever written as a whole: every mutation overwrites the
/// previous snapshot, so a read returns either a complete collection or
/// nothing. It is the fallback source of truth when the remote service is
/// unreachable at startup.
#[async_trait]
pub trait SnapshotCache: Send + Sync {
    /// The last snapshot stored under `key`, or `None` if none was ever
    /// stored.
    ///
    /// # Errors
    /// Returns an error if the underlying storage fails or holds a value
    /// that cannot be decoded.
    async fn get(&self, key: &str) -> Result<Option<Vec<Transaction>>, Error>;

    /// Replace the snapshot stored under `key`.
    ///
    /// # Errors
    /// Returns an error if the underlying storage fails.
    async fn set(&self, key: &str, snapshot: &[Transaction]) -> Result<(), Error>;
}
