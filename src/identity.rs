//! The authenticated-identity seam.
//!
//! Token issuance and session management live outside this crate; the store
//! only needs to know which user, if any, scopes the remote collection.

/// The identity of the user whose transactions are being managed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    /// The remote user ID that scopes list and create calls.
    pub user_id: i64,
}

/// Supplies the identity that scopes remote calls.
pub trait IdentityProvider: Send + Sync {
    /// The currently authenticated identity, or `None` in anonymous mode.
    fn current(&self) -> Option<Identity>;
}

/// An [IdentityProvider] that always returns the same answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedIdentityProvider {
    identity: Option<Identity>,
}

impl FixedIdentityProvider {
    /// A provider for the logged-in user with `user_id`.
    pub fn logged_in(user_id: i64) -> Self {
        Self {
            identity: Some(Identity { user_id }),
        }
    }

    /// A provider for anonymous mode.
    pub fn anonymous() -> Self {
        Self { identity: None }
    }
}

impl IdentityProvider for FixedIdentityProvider {
    fn current(&self) -> Option<Identity> {
        self.identity
    }
}
