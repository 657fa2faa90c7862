//! The remote category catalog.
//!
//! Categories live only in the remote service. Unlike transactions they
//! have no local fallback, so failures surface to the caller instead of
//! being absorbed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Error;

/// A spending category with its budget settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// The remote-assigned ID, absent until the category has been created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// The display name, matched against
    /// [Transaction::category](crate::Transaction::category) by exact
    /// string equality.
    pub name: String,
    /// The monthly spending limit for the category; 0 means no limit.
    pub budget_limit: f64,
    /// The display colour as a hex string, e.g. `#2196F3`.
    pub color: String,
}

/// Lists and creates categories in the remote service.
#[async_trait]
pub trait CategoryCatalog: Send + Sync {
    /// All categories known to the remote service.
    ///
    /// # Errors
    /// Returns an [Error::RemoteUnavailable], [Error::RemoteStatus] or
    /// [Error::RemoteParse] if the remote service cannot be reached or
    /// answers with something unusable.
    async fn categories(&self) -> Result<Vec<Category>, Error>;

    /// Create `category` and return it with its assigned ID.
    ///
    /// # Errors
    /// Same failure modes as [CategoryCatalog::categories].
    async fn create_category(&self, category: &Category) -> Result<Category, Error>;
}
