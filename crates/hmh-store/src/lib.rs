//! # hmh-store — Storage Abstractions
//!
//! The workflow core is specified against an abstract document store, not
//! a database. This crate defines that seam:
//!
//! - [`DocumentStore`] — object-safe async trait with `get`, `list`,
//!   `query_eq`, `add`, `update` over JSON documents addressed by a
//!   [`CollectionPath`] and a document id. Typed wrappers
//!   ([`get_doc`], [`add_doc`], ...) handle the serde round trips.
//! - [`MemoryStore`] — the in-memory reference implementation backing the
//!   test suites.
//! - [`BlobStore`] — the opaque attachment store consumed only at the
//!   finalize step, with pure file validation rules.
//!
//! ## Update semantics
//!
//! `update` performs a **shallow top-level merge**: fields present in the
//! patch replace fields in the stored document, a `null` value clears a
//! field, absent fields are untouched. This matches how the workflow
//! writes patches (e.g., clearing `paidAt` on a payment rejection).

pub mod blob;
pub mod document;
pub mod error;
pub mod memory;
pub mod path;

pub use blob::{BlobStore, FileCheck, FileUpload, MemoryBlobStore, UploadResult};
pub use document::{add_doc, get_doc, list_docs, query_docs, DocumentStore};
pub use error::StoreError;
pub use memory::MemoryStore;
pub use path::CollectionPath;
