//! Backing object store abstraction
//!
//! The validator needs three point-in-time lookups. Transport, caching and
//! watch machinery belong to whoever implements [`ObjectGetter`].

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use boundcred_core::StoreError;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// The parts of a stored object the validator looks at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundObject {
    /// Current uid of the object under this name
    pub uid: String,
    /// When deletion was requested, if it has been
    pub deletion_timestamp: Option<DateTime<Utc>>,
}

impl BoundObject {
    /// Create a live object with the given uid
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            deletion_timestamp: None,
        }
    }

    /// Mark the object as deleted at `at`
    pub fn with_deletion_timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.deletion_timestamp = Some(at);
        self
    }

    /// Check if deletion was requested strictly before `cutoff`
    pub fn deleted_before(&self, cutoff: DateTime<Utc>) -> bool {
        self.deletion_timestamp.is_some_and(|at| at < cutoff)
    }
}

/// Point-in-time lookups against the backing object store
///
/// Implementations must be thread-safe. Lookups are never retried by the
/// validator; an error is returned to the caller immediately.
#[async_trait]
pub trait ObjectGetter: Send + Sync {
    /// Get a service account by namespace and name
    async fn get_account(&self, namespace: &str, name: &str) -> Result<BoundObject, StoreError>;

    /// Get a secret by namespace and name
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<BoundObject, StoreError>;

    /// Get a pod by namespace and name
    async fn get_instance(&self, namespace: &str, name: &str) -> Result<BoundObject, StoreError>;

    /// Get a description of this store (for logging)
    fn description(&self) -> &str {
        "object getter"
    }
}

#[async_trait]
impl<G: ObjectGetter + ?Sized> ObjectGetter for Arc<G> {
    async fn get_account(&self, namespace: &str, name: &str) -> Result<BoundObject, StoreError> {
        (**self).get_account(namespace, name).await
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<BoundObject, StoreError> {
        (**self).get_secret(namespace, name).await
    }

    async fn get_instance(&self, namespace: &str, name: &str) -> Result<BoundObject, StoreError> {
        (**self).get_instance(namespace, name).await
    }

    fn description(&self) -> &str {
        (**self).description()
    }
}
