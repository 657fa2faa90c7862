//! Defines the core transaction model and its builders.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::Error;

/// Whether a transaction adds money to or removes money from the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Income => write!(f, "income"),
            Self::Expense => write!(f, "expense"),
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(format!(
                "unknown transaction type \"{other}\", expected \"income\" or \"expense\""
            )),
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or
/// earned.
///
/// To create a new `Transaction`, build a [NewTransaction] and pass it to
/// [TransactionStore::add](crate::TransactionStore::add), which takes care
/// of assigning the ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    ///
    /// Assigned by the remote service on creation, or generated locally
    /// when the remote service is unreachable or did not supply one.
    pub id: String,
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// The amount of money moved. Never negative; the sign of its
    /// contribution to the balance is determined solely by `kind`.
    pub amount: f64,
    /// Free-text label the transaction is grouped under, matched by exact
    /// string equality in aggregations.
    pub category: String,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened. Used for ordering and display only.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// ISO currency code, carried as-is and never converted at this layer.
    pub currency: String,
}

/// A transaction that has not been assigned an ID yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// Whether the transaction is income or an expense.
    pub kind: TransactionType,
    /// The amount of money moved. Never negative.
    pub amount: f64,
    /// Free-text label the transaction is grouped under.
    pub category: String,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    pub date: OffsetDateTime,
    /// ISO currency code.
    pub currency: String,
}

impl NewTransaction {
    /// Create a new transaction awaiting an ID.
    ///
    /// # Errors
    /// Returns an [Error::NegativeAmount] if `amount` is negative.
    pub fn new(
        kind: TransactionType,
        amount: f64,
        category: impl Into<String>,
        description: impl Into<String>,
        date: OffsetDateTime,
        currency: impl Into<String>,
    ) -> Result<Self, Error> {
        if amount < 0.0 {
            return Err(Error::NegativeAmount(amount));
        }

        Ok(Self {
            kind,
            amount,
            category: category.into(),
            description: description.into(),
            date,
            currency: currency.into(),
        })
    }

    /// Finalise the transaction with its assigned `id`.
    pub(crate) fn into_transaction(self, id: String) -> Transaction {
        Transaction {
            id,
            kind: self.kind,
            amount: self.amount,
            category: self.category,
            description: self.description,
            date: self.date,
            currency: self.currency,
        }
    }
}

/// A partial set of transaction fields to merge over an existing entry.
///
/// Fields left unset keep their current value. The ID of a transaction can
/// never be changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    /// The new transaction type, if it should change.
    pub kind: Option<TransactionType>,
    /// The new amount, if it should change. Never negative.
    pub amount: Option<f64>,
    /// The new category, if it should change.
    pub category: Option<String>,
    /// The new description, if it should change.
    pub description: Option<String>,
    /// The new date, if it should change.
    pub date: Option<OffsetDateTime>,
    /// The new currency code, if it should change.
    pub currency: Option<String>,
}

impl TransactionPatch {
    /// Create an empty patch. Applying it changes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the transaction type.
    pub fn kind(mut self, kind: TransactionType) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Set the amount.
    ///
    /// # Errors
    /// Returns an [Error::NegativeAmount] if `amount` is negative.
    pub fn amount(mut self, amount: f64) -> Result<Self, Error> {
        if amount < 0.0 {
            return Err(Error::NegativeAmount(amount));
        }

        self.amount = Some(amount);
        Ok(self)
    }

    /// Set the category.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the date.
    pub fn date(mut self, date: OffsetDateTime) -> Self {
        self.date = Some(date);
        self
    }

    /// Set the currency code.
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Merge the set fields over `transaction`, leaving the rest untouched.
    pub(crate) fn apply_to(&self, transaction: &mut Transaction) {
        if let Some(kind) = self.kind {
            transaction.kind = kind;
        }
        if let Some(amount) = self.amount {
            transaction.amount = amount;
        }
        if let Some(category) = &self.category {
            transaction.category = category.clone();
        }
        if let Some(description) = &self.description {
            transaction.description = description.clone();
        }
        if let Some(date) = self.date {
            transaction.date = date;
        }
        if let Some(currency) = &self.currency {
            transaction.currency = currency.clone();
        }
    }
}

/// Generate an ID for a transaction the remote service did not identify.
pub(crate) fn local_id() -> String {
    Uuid::new_v4().to_string()
}
