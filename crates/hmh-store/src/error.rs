//! # Storage Errors
//!
//! Failures of the document and blob stores. These propagate to workflow
//! callers as [`WorkflowError::Storage`]; the workflow never retries them.

use thiserror::Error;

use hmh_core::WorkflowError;

/// Error from a document- or blob-store operation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The addressed document does not exist (update target missing).
    #[error("document {id} not found in {path}")]
    DocumentNotFound {
        /// Collection path.
        path: String,
        /// Document id.
        id: String,
    },

    /// A document with this id already exists (add collision).
    #[error("document {id} already exists in {path}")]
    DuplicateDocument {
        /// Collection path.
        path: String,
        /// Document id.
        id: String,
    },

    /// A stored document failed to (de)serialize against its entity type.
    #[error("corrupt document: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// The storage backend failed (network, quota, permission).
    #[error("backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for WorkflowError {
    fn from(err: StoreError) -> Self {
        WorkflowError::Storage(err.to_string())
    }
}
