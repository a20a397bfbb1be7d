//! Read-only access to cached cluster objects.

use std::sync::Arc;

use thiserror::Error;

/// Errors returned by a [`Lister`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The object does not exist in the cache.
    #[error("{kind} \"{name}\" not found")]
    NotFound { kind: &'static str, name: String },

    /// The cache has not completed its initial sync.
    #[error("{kind} cache has not synced")]
    NotSynced { kind: &'static str },

    /// Any other cache fault.
    #[error("{kind} cache error: {message}")]
    Internal { kind: &'static str, message: String },
}

impl LookupError {
    /// True when the object is simply absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LookupError::NotFound { .. })
    }
}

/// Name-keyed lookup against a local object cache.
pub trait Lister<T>: Send + Sync {
    fn get(&self, name: &str) -> Result<Arc<T>, LookupError>;
}
