//! # The Document Store Seam
//!
//! [`DocumentStore`] is the single persistence interface the workflow
//! engine talks to. It is object-safe — engines hold `Arc<dyn
//! DocumentStore>` — so the raw methods speak `serde_json::Value`; the
//! typed free functions below wrap the serde round trips.
//!
//! Document ids are caller-generated (UUID newtypes rendered as strings),
//! so an entity's `id` field and its store address never diverge.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::StoreError;
use crate::path::CollectionPath;

/// Abstract document store addressed by collection path + document id.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document, `None` if absent.
    async fn get(&self, path: &CollectionPath, id: &str) -> Result<Option<Value>, StoreError>;

    /// All documents of a collection, in insertion order.
    async fn list(&self, path: &CollectionPath) -> Result<Vec<Value>, StoreError>;

    /// Documents whose top-level `field` equals `value`, in insertion order.
    async fn query_eq(
        &self,
        path: &CollectionPath,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>, StoreError>;

    /// Insert a new document. Fails with
    /// [`StoreError::DuplicateDocument`] if the id is taken.
    async fn add(&self, path: &CollectionPath, id: &str, doc: Value) -> Result<(), StoreError>;

    /// Shallow-merge `patch` into an existing document: present fields
    /// replace, `null` clears, absent fields are untouched. Fails with
    /// [`StoreError::DocumentNotFound`] if the document is absent.
    async fn update(&self, path: &CollectionPath, id: &str, patch: Value) -> Result<(), StoreError>;
}

/// Fetch and deserialize one document.
pub async fn get_doc<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    path: &CollectionPath,
    id: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(path, id).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Serialize and insert one document under `id`.
pub async fn add_doc<T: Serialize>(
    store: &dyn DocumentStore,
    path: &CollectionPath,
    id: &str,
    doc: &T,
) -> Result<(), StoreError> {
    store.add(path, id, serde_json::to_value(doc)?).await
}

/// List and deserialize a whole collection.
pub async fn list_docs<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    path: &CollectionPath,
) -> Result<Vec<T>, StoreError> {
    store
        .list(path)
        .await?
        .into_iter()
        .map(|v| serde_json::from_value(v).map_err(StoreError::from))
        .collect()
}

/// Query by field equality and deserialize the matches.
pub async fn query_docs<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    path: &CollectionPath,
    field: &str,
    value: &Value,
) -> Result<Vec<T>, StoreError> {
    store
        .query_eq(path, field, value)
        .await?
        .into_iter()
        .map(|v| serde_json::from_value(v).map_err(StoreError::from))
        .collect()
}
