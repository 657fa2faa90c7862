//! The core transaction store: reconciles the remote collection with the
//! local snapshot cache and publishes the result to subscribers.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, watch};

use crate::{
    aggregate,
    cache::{SNAPSHOT_KEY, SnapshotCache},
    identity::IdentityProvider,
    remote::{NewRemoteTransaction, RemoteStore, RemoteTransactionPatch},
    transaction::{NewTransaction, Transaction, TransactionPatch, TransactionType, local_id},
};

/// A complete, consistent set of transactions at one point in time.
///
/// Snapshots are shared by reference with every subscriber; the store is
/// the sole writer and subscribers must treat them as read-only.
pub type Snapshot = Arc<Vec<Transaction>>;

/// How far a mutation was persisted.
///
/// Remote failures are absorbed rather than surfaced, so this is the only
/// way for a caller to tell a fully synchronised write from one that only
/// reached local state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// The remote service confirmed the operation.
    Synced,
    /// The remote service was unreachable or rejected the operation; the
    /// change exists in local state only.
    LocalOnly,
}

/// Owns the canonical in-memory transaction collection.
///
/// The remote service is the source of truth at startup
/// ([TransactionStore::load]); afterwards the in-memory collection is, and
/// the remote service and the cache hold mirrored copies. Every mutation
/// follows the same pipeline: attempt the remote operation, apply the
/// change locally regardless of the outcome, mirror the new snapshot to
/// the cache, publish it to subscribers exactly once.
///
/// No public operation fails outward. Remote and cache errors are logged
/// and absorbed, and mutations on unknown IDs are silent no-ops.
pub struct TransactionStore<R, C, I>
where
    R: RemoteStore,
    C: SnapshotCache,
    I: IdentityProvider,
{
    remote: R,
    cache: C,
    identity: I,
    /// Serializes the read-modify-mirror-publish sequence of each
    /// operation, so observers never see an intermediate state.
    write_lock: Mutex<()>,
    publisher: watch::Sender<Snapshot>,
}

impl<R, C, I> TransactionStore<R, C, I>
where
    R: RemoteStore,
    C: SnapshotCache,
    I: IdentityProvider,
{
    /// Create a store with an empty collection.
    ///
    /// Call [TransactionStore::load] to populate it.
    pub fn new(remote: R, cache: C, identity: I) -> Self {
        let (publisher, _) = watch::channel(Snapshot::default());

        Self {
            remote,
            cache,
            identity,
            write_lock: Mutex::new(()),
            publisher,
        }
    }

    /// Populate the collection from the remote service, falling back to
    /// the last cached snapshot when the remote returns nothing or fails.
    ///
    /// A non-empty remote result replaces the collection and re-warms the
    /// cache. An empty result is treated exactly like a failure: the cached
    /// snapshot (or an empty collection) is used and the cache is left
    /// untouched. Publishes the resulting collection exactly once and
    /// never fails; every path resolves to some valid collection.
    pub async fn load(&self) -> SyncStatus {
        let _guard = self.write_lock.lock().await;
        let owner = self.identity.current();

        match self.remote.list(owner.as_ref()).await {
            Ok(records) if !records.is_empty() => {
                let transactions = records
                    .into_iter()
                    .map(|record| record.into_transaction())
                    .collect();
                self.commit(transactions).await;

                SyncStatus::Synced
            }
            Ok(_) => {
                tracing::debug!(
                    "the remote service returned no transactions, using the cached snapshot"
                );
                self.publish_cached().await;

                SyncStatus::LocalOnly
            }
            Err(error) => {
                tracing::error!("could not load transactions from the remote service: {error}");
                self.publish_cached().await;

                SyncStatus::LocalOnly
            }
        }
    }

    /// Re-run the remote reconciliation, e.g. once connectivity returns.
    pub async fn sync(&self) -> SyncStatus {
        self.load().await
    }

    /// Append one new transaction.
    ///
    /// The ID is assigned by the remote service when it is reachable and
    /// generated locally otherwise (no retry). Either way the returned
    /// transaction is in the next published snapshot and in the cache,
    /// exactly once.
    pub async fn add(&self, new: NewTransaction) -> (Transaction, SyncStatus) {
        let _guard = self.write_lock.lock().await;
        let owner = self.identity.current();
        let payload = NewRemoteTransaction::from_new(&new, owner.as_ref());

        let (id, status) = match self.remote.create(&payload).await {
            Ok(created) => (created.id.unwrap_or_else(local_id), SyncStatus::Synced),
            Err(error) => {
                tracing::error!("could not create the transaction remotely: {error}");
                (local_id(), SyncStatus::LocalOnly)
            }
        };

        let transaction = new.into_transaction(id);
        let mut transactions = self.current();
        transactions.push(transaction.clone());
        self.commit(transactions).await;

        (transaction, status)
    }

    /// Merge `patch` into the transaction with `id`.
    ///
    /// The local merge is applied whether or not the remote service
    /// accepted the change, so the collection never diverges from what the
    /// caller was just told. An unknown `id` is a silent no-op.
    pub async fn update(&self, id: &str, patch: TransactionPatch) -> SyncStatus {
        let _guard = self.write_lock.lock().await;
        let payload = RemoteTransactionPatch::from_patch(&patch);

        let status = match self.remote.patch(id, &payload).await {
            Ok(_) => SyncStatus::Synced,
            Err(error) => {
                tracing::error!("could not update transaction {id} remotely: {error}");
                SyncStatus::LocalOnly
            }
        };

        let mut transactions = self.current();
        for transaction in transactions.iter_mut().filter(|t| t.id == id) {
            patch.apply_to(transaction);
        }
        self.commit(transactions).await;

        status
    }

    /// Remove the transaction with `id`.
    ///
    /// An unknown `id` is a silent no-op, which makes removal idempotent.
    pub async fn remove(&self, id: &str) -> SyncStatus {
        let _guard = self.write_lock.lock().await;

        let status = match self.remote.delete(id).await {
            Ok(()) => SyncStatus::Synced,
            Err(error) => {
                tracing::error!("could not delete transaction {id} remotely: {error}");
                SyncStatus::LocalOnly
            }
        };

        let mut transactions = self.current();
        transactions.retain(|transaction| transaction.id != id);
        self.commit(transactions).await;

        status
    }

    /// The latest published snapshot.
    pub fn transactions(&self) -> Snapshot {
        self.publisher.borrow().clone()
    }

    /// Subscribe to the stream of published snapshots.
    ///
    /// The receiver starts out holding the latest snapshot, so a late
    /// subscriber sees the current state immediately and every subsequent
    /// publish after that.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.publisher.subscribe()
    }

    /// Subscribe to the [TransactionType]-filtered view of every snapshot.
    pub fn subscribe_by_type(&self, kind: TransactionType) -> TypeSubscription {
        TypeSubscription {
            receiver: self.publisher.subscribe(),
            kind,
        }
    }

    /// The sum of the amounts of all transactions of `kind` in the current
    /// snapshot.
    pub fn total_by_type(&self, kind: TransactionType) -> f64 {
        aggregate::total_by_type(&self.transactions(), kind)
    }

    /// Total income minus total expenses for the current snapshot.
    pub fn balance(&self) -> f64 {
        aggregate::balance(&self.transactions())
    }

    /// The amounts summed per category for the current snapshot.
    pub fn totals_by_category(&self) -> HashMap<String, f64> {
        aggregate::totals_by_category(&self.transactions())
    }

    /// A clone of the current collection, ready to modify.
    fn current(&self) -> Vec<Transaction> {
        self.publisher.borrow().as_ref().clone()
    }

    /// Mirror `transactions` to the cache, then publish it as the new
    /// snapshot.
    ///
    /// Cache failures are logged and absorbed; the publish happens
    /// regardless.
    async fn commit(&self, transactions: Vec<Transaction>) {
        if let Err(error) = self.cache.set(SNAPSHOT_KEY, &transactions).await {
            tracing::error!("could not mirror the snapshot to the local cache: {error}");
        }

        self.publisher.send_replace(Arc::new(transactions));
    }

    /// Publish the cached snapshot, or an empty collection when none
    /// exists or the cache cannot be read.
    async fn publish_cached(&self) {
        let transactions = match self.cache.get(SNAPSHOT_KEY).await {
            Ok(Some(transactions)) => transactions,
            Ok(None) => Vec::new(),
            Err(error) => {
                tracing::error!("could not read the cached snapshot: {error}");
                Vec::new()
            }
        };

        self.publisher.send_replace(Arc::new(transactions));
    }
}

/// A derived observable that filters each published snapshot by
/// transaction type.
pub struct TypeSubscription {
    receiver: watch::Receiver<Snapshot>,
    kind: TransactionType,
}

impl TypeSubscription {
    /// The filtered view of the latest snapshot.
    pub fn current(&self) -> Vec<Transaction> {
        self.receiver
            .borrow()
            .iter()
            .filter(|transaction| transaction.kind == self.kind)
            .cloned()
            .collect()
    }

    /// Wait for the next published snapshot and return its filtered view,
    /// or `None` once the store has been dropped.
    pub async fn next(&mut self) -> Option<Vec<Transaction>> {
        self.receiver.changed().await.ok()?;

        Some(self.current())
    }
}
