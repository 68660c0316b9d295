//! In-memory object store
//!
//! Keeps accounts, secrets and pods in hashmaps keyed by namespace and name.
//! Useful for embedding and tests; nothing is persisted.

use async_trait::async_trait;
use boundcred_core::{ObjectKind, StoreError};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::info;

use super::{BoundObject, ObjectGetter};

type ObjectTable = RwLock<HashMap<(String, String), BoundObject>>;

/// In-memory object store implementation
#[derive(Debug, Default)]
pub struct MemoryStore {
    accounts: ObjectTable,
    secrets: ObjectTable,
    instances: ObjectTable,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, kind: ObjectKind) -> &ObjectTable {
        match kind {
            ObjectKind::Account => &self.accounts,
            ObjectKind::Secret => &self.secrets,
            ObjectKind::Instance => &self.instances,
        }
    }

    /// Store an object, replacing any previous one with the same name
    pub fn insert(&self, kind: ObjectKind, namespace: &str, name: &str, object: BoundObject) {
        let mut table = self.table(kind).write().unwrap_or_else(PoisonError::into_inner);
        info!(%kind, namespace = %namespace, name = %name, uid = %object.uid, "Storing object");
        table.insert((namespace.to_string(), name.to_string()), object);
    }

    pub fn insert_account(&self, namespace: &str, name: &str, object: BoundObject) {
        self.insert(ObjectKind::Account, namespace, name, object);
    }

    pub fn insert_secret(&self, namespace: &str, name: &str, object: BoundObject) {
        self.insert(ObjectKind::Secret, namespace, name, object);
    }

    pub fn insert_instance(&self, namespace: &str, name: &str, object: BoundObject) {
        self.insert(ObjectKind::Instance, namespace, name, object);
    }

    /// Remove an object outright
    pub fn remove(&self, kind: ObjectKind, namespace: &str, name: &str) -> bool {
        let mut table = self.table(kind).write().unwrap_or_else(PoisonError::into_inner);
        let removed = table
            .remove(&(namespace.to_string(), name.to_string()))
            .is_some();
        if removed {
            info!(%kind, namespace = %namespace, name = %name, "Removed object");
        }
        removed
    }

    /// Record a deletion request without removing the object
    pub fn mark_deleted(&self, kind: ObjectKind, namespace: &str, name: &str, at: DateTime<Utc>) -> bool {
        let mut table = self.table(kind).write().unwrap_or_else(PoisonError::into_inner);
        match table.get_mut(&(namespace.to_string(), name.to_string())) {
            Some(object) => {
                info!(%kind, namespace = %namespace, name = %name, deleted_at = %at, "Marked object deleted");
                object.deletion_timestamp = Some(at);
                true
            }
            None => false,
        }
    }

    fn lookup(&self, kind: ObjectKind, namespace: &str, name: &str) -> Result<BoundObject, StoreError> {
        let table = self.table(kind).read().unwrap_or_else(PoisonError::into_inner);
        table
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::not_found(kind, namespace, name))
    }
}

#[async_trait]
impl ObjectGetter for MemoryStore {
    async fn get_account(&self, namespace: &str, name: &str) -> Result<BoundObject, StoreError> {
        self.lookup(ObjectKind::Account, namespace, name)
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<BoundObject, StoreError> {
        self.lookup(ObjectKind::Secret, namespace, name)
    }

    async fn get_instance(&self, namespace: &str, name: &str) -> Result<BoundObject, StoreError> {
        self.lookup(ObjectKind::Instance, namespace, name)
    }

    fn description(&self) -> &str {
        "in-memory object store"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_by_namespace_and_name() {
        let store = MemoryStore::new();
        store.insert_account("ns1", "sa1", BoundObject::new("u1"));

        let found = store.get_account("ns1", "sa1").await.unwrap();
        assert_eq!(found.uid, "u1");

        let other_ns = store.get_account("ns2", "sa1").await;
        assert!(matches!(other_ns, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_kinds_are_separate() {
        let store = MemoryStore::new();
        store.insert_secret("ns1", "shared-name", BoundObject::new("s1"));

        assert!(store.get_secret("ns1", "shared-name").await.is_ok());
        assert!(store.get_instance("ns1", "shared-name").await.is_err());
        assert!(store.get_account("ns1", "shared-name").await.is_err());
    }

    #[tokio::test]
    async fn test_recreate_changes_uid() {
        let store = MemoryStore::new();
        store.insert_instance("ns1", "pod1", BoundObject::new("p1"));
        assert!(store.remove(ObjectKind::Instance, "ns1", "pod1"));
        assert!(!store.remove(ObjectKind::Instance, "ns1", "pod1"));

        store.insert_instance("ns1", "pod1", BoundObject::new("p2"));
        assert_eq!(store.get_instance("ns1", "pod1").await.unwrap().uid, "p2");
    }

    #[tokio::test]
    async fn test_mark_deleted() {
        let store = MemoryStore::new();
        let at = Utc::now();
        store.insert_account("ns1", "sa1", BoundObject::new("u1"));

        assert!(store.mark_deleted(ObjectKind::Account, "ns1", "sa1", at));
        assert!(!store.mark_deleted(ObjectKind::Account, "ns1", "missing", at));

        let found = store.get_account("ns1", "sa1").await.unwrap();
        assert_eq!(found.deletion_timestamp, Some(at));
    }

    #[tokio::test]
    async fn test_not_found_message() {
        let store = MemoryStore::new();
        let err = store.get_secret("ns1", "s1").await.unwrap_err();
        assert_eq!(err.to_string(), "secrets \"s1\" not found");
    }
}
