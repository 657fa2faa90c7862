//! Defines the remote transaction store trait and its wire types.
//!
//! The wire shape differs from the internal [Transaction] in two ways: the
//! ID is optional (the remote service assigns it on creation) and records
//! may carry a `user_id` that scopes them to their owner.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    identity::Identity,
    transaction::{NewTransaction, Transaction, TransactionPatch, TransactionType, local_id},
};

/// Handles CRUD against the remote transaction collection.
///
/// Implementations signal failure through [Error].
/// [TransactionStore](crate::TransactionStore) absorbs those failures and
/// falls back to local-only behaviour, so no retry logic belongs here.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Retrieve the transactions owned by `owner`, or the whole collection
    /// in anonymous mode.
    ///
    /// # Errors
    /// Returns an [Error::RemoteUnavailable], [Error::RemoteStatus] or
    /// [Error::RemoteParse] if the remote service cannot be reached or
    /// answers with something unusable.
    async fn list(&self, owner: Option<&Identity>) -> Result<Vec<RemoteTransaction>, Error>;

    /// Create a new transaction in the remote collection.
    ///
    /// The returned record carries the remote-assigned ID when the service
    /// provides one.
    ///
    /// # Errors
    /// Same failure modes as [RemoteStore::list].
    async fn create(&self, payload: &NewRemoteTransaction) -> Result<RemoteTransaction, Error>;

    /// Merge `payload` into the remote transaction with `id`.
    ///
    /// # Errors
    /// Same failure modes as [RemoteStore::list].
    async fn patch(
        &self,
        id: &str,
        payload: &RemoteTransactionPatch,
    ) -> Result<RemoteTransaction, Error>;

    /// Delete the remote transaction with `id`.
    ///
    /// # Errors
    /// Same failure modes as [RemoteStore::list].
    async fn delete(&self, id: &str) -> Result<(), Error>;
}

/// The wire representation of a transaction.
///
/// The remote service encodes assigned IDs as JSON numbers or strings
/// depending on how the record was created, so deserialization accepts
/// both and normalises to a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteTransaction {
    /// The remote-assigned ID, if the record has one.
    #[serde(
        default,
        deserialize_with = "id_from_number_or_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// The amount of money moved.
    pub amount: f64,
    /// Free-text label the transaction is grouped under.
    pub category: String,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened, as RFC 3339 text on the wire.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// ISO currency code.
    pub currency: String,
    /// The user that owns the record, when the collection is scoped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

impl RemoteTransaction {
    /// Convert the record to the internal shape, generating a local ID
    /// when the remote record has none.
    pub fn into_transaction(self) -> Transaction {
        Transaction {
            id: self.id.unwrap_or_else(local_id),
            kind: self.kind,
            amount: self.amount,
            category: self.category,
            description: self.description,
            date: self.date,
            currency: self.currency,
        }
    }
}

/// The wire payload for creating a transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRemoteTransaction {
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// The amount of money moved.
    pub amount: f64,
    /// Free-text label the transaction is grouped under.
    pub category: String,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened, as RFC 3339 text on the wire.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// ISO currency code.
    pub currency: String,
    /// The user the record belongs to, when one is logged in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

impl NewRemoteTransaction {
    /// Build the creation payload for `new`, scoped to `owner` when present.
    pub fn from_new(new: &NewTransaction, owner: Option<&Identity>) -> Self {
        Self {
            kind: new.kind,
            amount: new.amount,
            category: new.category.clone(),
            description: new.description.clone(),
            date: new.date,
            currency: new.currency.clone(),
            user_id: owner.map(|identity| identity.user_id),
        }
    }
}

/// The wire payload for partially updating a transaction.
///
/// Only fields that were explicitly set are serialized, so the remote
/// merge touches nothing else.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RemoteTransactionPatch {
    /// The new transaction type, if it should change.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionType>,
    /// The new amount, if it should change.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    /// The new category, if it should change.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// The new description, if it should change.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The new date, if it should change.
    #[serde(
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<OffsetDateTime>,
    /// The new currency code, if it should change.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl RemoteTransactionPatch {
    /// Build the partial payload for `patch`.
    pub fn from_patch(patch: &TransactionPatch) -> Self {
        Self {
            kind: patch.kind,
            amount: patch.amount,
            category: patch.category.clone(),
            description: patch.description.clone(),
            date: patch.date,
            currency: patch.currency.clone(),
        }
    }
}

/// Accept the ID as either a JSON number or a string.
fn id_from_number_or_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(id)) => Ok(Some(id)),
        Some(serde_json::Value::Number(id)) => Ok(Some(id.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "invalid transaction id {other}"
        ))),
    }
}
