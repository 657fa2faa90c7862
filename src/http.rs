//! A reqwest backed implementation of the remote seams.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::{
    Error,
    category::{Category, CategoryCatalog},
    identity::Identity,
    remote::{NewRemoteTransaction, RemoteStore, RemoteTransaction, RemoteTransactionPatch},
};

/// How long to wait for the remote service before giving up on a request.
///
/// The store treats a timeout like any other remote failure and falls back
/// to local-only behaviour, so this bounds how long a single operation can
/// stall on a hung connection.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Talks to a REST transaction service.
///
/// The service exposes `/transactions` and `/categories` collections with
/// JSON bodies; list and create calls are scoped per user via a `user_id`
/// query parameter and body field.
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    client: Client,
    base_url: Url,
}

impl HttpRemoteStore {
    /// Create a store for the service at `base_url` with the
    /// [default request timeout](DEFAULT_REQUEST_TIMEOUT).
    ///
    /// # Errors
    /// Returns an [Error::InvalidBaseUrl] if `base_url` is not a valid
    /// absolute URL.
    pub fn new(base_url: &str) -> Result<Self, Error> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a store that waits at most `timeout` for each request.
    ///
    /// # Errors
    /// Returns an [Error::InvalidBaseUrl] if `base_url` is not a valid
    /// absolute URL, or an [Error::RemoteUnavailable] if the HTTP client
    /// cannot be constructed.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        // A base URL without a trailing slash would swallow its last path
        // segment when joined against.
        let normalized = if base_url.ends_with('/') {
            base_url.to_owned()
        } else {
            format!("{base_url}/")
        };
        let base_url =
            Url::parse(&normalized).map_err(|_| Error::InvalidBaseUrl(base_url.to_owned()))?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        self.base_url
            .join(path)
            .map_err(|_| Error::InvalidBaseUrl(format!("{}{path}", self.base_url)))
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn list(&self, owner: Option<&Identity>) -> Result<Vec<RemoteTransaction>, Error> {
        let mut request = self.client.get(self.endpoint("transactions")?);
        if let Some(owner) = owner {
            request = request.query(&[("user_id", owner.user_id)]);
        }

        let transactions = request
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<RemoteTransaction>>()
            .await?;

        Ok(transactions)
    }

    async fn create(&self, payload: &NewRemoteTransaction) -> Result<RemoteTransaction, Error> {
        let created = self
            .client
            .post(self.endpoint("transactions")?)
            .json(payload)
            .send()
            .await?
            .error_for_status()?
            .json::<RemoteTransaction>()
            .await?;

        Ok(created)
    }

    async fn patch(
        &self,
        id: &str,
        payload: &RemoteTransactionPatch,
    ) -> Result<RemoteTransaction, Error> {
        let updated = self
            .client
            .patch(self.endpoint(&format!("transactions/{id}"))?)
            .json(payload)
            .send()
            .await?
            .error_for_status()?
            .json::<RemoteTransaction>()
            .await?;

        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<(), Error> {
        self.client
            .delete(self.endpoint(&format!("transactions/{id}"))?)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

#[async_trait]
impl CategoryCatalog for HttpRemoteStore {
    async fn categories(&self) -> Result<Vec<Category>, Error> {
        let categories = self
            .client
            .get(self.endpoint("categories")?)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<Category>>()
            .await?;

        Ok(categories)
    }

    async fn create_category(&self, category: &Category) -> Result<Category, Error> {
        let created = self
            .client
            .post(self.endpoint("categories")?)
            .json(category)
            .send()
            .await?
            .error_for_status()?
            .json::<Category>()
            .await?;

        Ok(created)
    }
}

#[cfg(test)]
mod http_remote_store_tests {
    use crate::Error;

    use super::HttpRemoteStore;

    #[test]
    fn endpoints_are_joined_onto_the_base_url() {
        let store = HttpRemoteStore::new("http://localhost:3000").expect("Could not build store");

        let endpoint = store.endpoint("transactions").expect("Could not build endpoint");

        assert_eq!(endpoint.as_str(), "http://localhost:3000/transactions");
    }

    #[test]
    fn trailing_slash_in_the_base_url_is_tolerated() {
        let store =
            HttpRemoteStore::new("http://localhost:3000/api/").expect("Could not build store");

        let endpoint = store
            .endpoint("transactions/42")
            .expect("Could not build endpoint");

        assert_eq!(
            endpoint.as_str(),
            "http://localhost:3000/api/transactions/42"
        );
    }

    #[test]
    fn rejects_an_unparseable_base_url() {
        let result = HttpRemoteStore::new("not a url");

        assert_eq!(result.err(), Some(Error::InvalidBaseUrl("not a url".to_owned())));
    }
}
