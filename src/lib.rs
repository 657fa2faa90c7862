//! Monedero keeps a personal ledger of income and expense transactions in
//! sync with a remote collection, falling back to an on-device snapshot
//! cache whenever the remote service cannot be reached.
//!
//! The in-memory collection owned by [TransactionStore] is the source of
//! truth while the process is alive; the remote service and the local cache
//! only ever hold mirrored copies of it. Mutations are optimistic: the
//! remote write is attempted first, but the local change is applied and
//! published whether or not it succeeded, and the outcome is reported
//! through [SyncStatus] rather than an error.

#![warn(missing_docs)]

mod aggregate;
mod cache;
mod category;
mod http;
mod identity;
mod remote;
mod sqlite_cache;
mod store;
mod transaction;

pub use aggregate::{balance, total_by_type, totals_by_category};
pub use cache::{SNAPSHOT_KEY, SnapshotCache};
pub use category::{Category, CategoryCatalog};
pub use http::{DEFAULT_REQUEST_TIMEOUT, HttpRemoteStore};
pub use identity::{FixedIdentityProvider, Identity, IdentityProvider};
pub use remote::{NewRemoteTransaction, RemoteStore, RemoteTransaction, RemoteTransactionPatch};
pub use sqlite_cache::SqliteSnapshotCache;
pub use store::{Snapshot, SyncStatus, TransactionStore, TypeSubscription};
pub use transaction::{NewTransaction, Transaction, TransactionPatch, TransactionType};

/// The errors that may occur in the application.
///
/// Errors from the remote service and the cache never reach consumers of
/// [TransactionStore]; they are absorbed there and logged. This type is what
/// the lower-level seams ([RemoteStore], [SnapshotCache]) speak.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The remote transaction service could not be reached (connection,
    /// DNS or timeout failure).
    #[error("could not reach the remote transaction service: {0}")]
    RemoteUnavailable(String),

    /// The remote transaction service answered with a non-success HTTP
    /// status.
    #[error("the remote transaction service returned status {0}")]
    RemoteStatus(u16),

    /// The remote transaction service answered with a body that could not
    /// be decoded.
    #[error("could not decode the remote response: {0}")]
    RemoteParse(String),

    /// An unhandled/unexpected SQL error from the cache database.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while serializing or deserializing a snapshot as
    /// JSON.
    #[error("could not serialize as JSON: {0}")]
    JsonSerialization(String),

    /// A negative amount was used to create or update a transaction.
    ///
    /// Amounts are always non-negative; whether money was earned or spent
    /// is carried by [TransactionType], not by the sign.
    #[error("{0} is a negative amount, which is not allowed")]
    NegativeAmount(f64),

    /// The API base URL could not be parsed.
    #[error("invalid API base URL \"{0}\"")]
    InvalidBaseUrl(String),
}

impl From<rusqlite::Error> for Error {
    fn from(error: rusqlite::Error) -> Self {
        Error::SqlError(error)
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::JsonSerialization(error.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            return Error::RemoteParse(error.to_string());
        }

        match error.status() {
            Some(status) => Error::RemoteStatus(status.as_u16()),
            None => Error::RemoteUnavailable(error.to_string()),
        }
    }
}
