//! # In-Memory Document Store
//!
//! The reference [`DocumentStore`] implementation: collections are vectors
//! of `(id, document)` pairs behind one async read-write lock, preserving
//! insertion order. It backs every test suite in the workspace and any
//! demo wiring; production deployments substitute a real backend at the
//! same trait seam.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::document::DocumentStore;
use crate::error::StoreError;
use crate::path::CollectionPath;

/// In-memory document store with insertion-ordered collections.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<(String, Value)>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of documents across all collections.
    pub async fn document_count(&self) -> usize {
        self.collections.read().await.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &CollectionPath, id: &str) -> Result<Option<Value>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(path.as_str())
            .and_then(|docs| docs.iter().find(|(doc_id, _)| doc_id == id))
            .map(|(_, doc)| doc.clone()))
    }

    async fn list(&self, path: &CollectionPath) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(path.as_str())
            .map(|docs| docs.iter().map(|(_, doc)| doc.clone()).collect())
            .unwrap_or_default())
    }

    async fn query_eq(
        &self,
        path: &CollectionPath,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(path.as_str())
            .map(|docs| {
                docs.iter()
                    .filter(|(_, doc)| doc.get(field) == Some(value))
                    .map(|(_, doc)| doc.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn add(&self, path: &CollectionPath, id: &str, doc: Value) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(path.as_str().to_string()).or_default();
        if docs.iter().any(|(doc_id, _)| doc_id == id) {
            return Err(StoreError::DuplicateDocument {
                path: path.to_string(),
                id: id.to_string(),
            });
        }
        docs.push((id.to_string(), doc));
        Ok(())
    }

    async fn update(&self, path: &CollectionPath, id: &str, patch: Value) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let docs = collections
            .get_mut(path.as_str())
            .ok_or_else(|| StoreError::DocumentNotFound {
                path: path.to_string(),
                id: id.to_string(),
            })?;
        let (_, doc) = docs
            .iter_mut()
            .find(|(doc_id, _)| doc_id == id)
            .ok_or_else(|| StoreError::DocumentNotFound {
                path: path.to_string(),
                id: id.to_string(),
            })?;

        let Some(target) = doc.as_object_mut() else {
            return Err(StoreError::Backend(format!(
                "document {id} in {path} is not an object"
            )));
        };
        if let Value::Object(fields) = patch {
            for (key, value) in fields {
                if value.is_null() {
                    target.remove(&key);
                } else {
                    target.insert(key, value);
                }
            }
        } else {
            return Err(StoreError::Backend("update patch must be an object".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn activities() -> CollectionPath {
        CollectionPath::activities()
    }

    #[tokio::test]
    async fn test_add_then_get() {
        let store = MemoryStore::new();
        store
            .add(&activities(), "a1", json!({"status": "pending_assignment"}))
            .await
            .unwrap();
        let doc = store.get(&activities(), "a1").await.unwrap().unwrap();
        assert_eq!(doc["status"], "pending_assignment");
        assert!(store.get(&activities(), "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_add_rejected() {
        let store = MemoryStore::new();
        store.add(&activities(), "a1", json!({})).await.unwrap();
        let err = store.add(&activities(), "a1", json!({})).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateDocument { .. }));
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store
                .add(&activities(), &format!("a{i}"), json!({"seq": i}))
                .await
                .unwrap();
        }
        let docs = store.list(&activities()).await.unwrap();
        let seqs: Vec<i64> = docs.iter().map(|d| d["seq"].as_i64().unwrap()).collect();
        assert_eq!(seqs, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_query_eq_filters_by_field() {
        let store = MemoryStore::new();
        store
            .add(&activities(), "a1", json!({"tenantId": "t1", "status": "assigned"}))
            .await
            .unwrap();
        store
            .add(&activities(), "a2", json!({"tenantId": "t2", "status": "assigned"}))
            .await
            .unwrap();
        let docs = store
            .query_eq(&activities(), "tenantId", &json!("t1"))
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["tenantId"], "t1");
    }

    #[tokio::test]
    async fn test_update_shallow_merge_and_null_clears() {
        let store = MemoryStore::new();
        store
            .add(&activities(), "a1", json!({"status": "paid", "paidAt": "2026-01-01T00:00:00Z"}))
            .await
            .unwrap();
        store
            .update(&activities(), "a1", json!({"status": "rejected", "paidAt": null}))
            .await
            .unwrap();
        let doc = store.get(&activities(), "a1").await.unwrap().unwrap();
        assert_eq!(doc["status"], "rejected");
        assert!(doc.get("paidAt").is_none());
    }

    #[tokio::test]
    async fn test_update_missing_document_fails() {
        let store = MemoryStore::new();
        let err = store
            .update(&activities(), "nope", json!({"status": "assigned"}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DocumentNotFound { .. }));
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let store = MemoryStore::new();
        store.add(&activities(), "x", json!({"kind": "activity"})).await.unwrap();
        store
            .add(&CollectionPath::service_orders(), "x", json!({"kind": "order"}))
            .await
            .unwrap();
        assert_eq!(store.document_count().await, 2);
        let orders = store.list(&CollectionPath::service_orders()).await.unwrap();
        assert_eq!(orders[0]["kind"], "order");
    }
}
