//! # Blob Store — Activity Support Attachments
//!
//! The opaque file store behind support documents. The workflow consumes
//! it only at the finalize step: validate the file, upload it, and attach
//! the resulting `{name, url}` to the activity.
//!
//! [`FileCheck`] rules are pure and mirror the platform's upload policy:
//! at most 10 MB, and a MIME allowlist of documents, images, and
//! archives.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Maximum accepted upload size: 10 MB.
pub const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// MIME types accepted as support documents.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    // Documents
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    // Images
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    // Archives
    "application/zip",
    "application/x-rar-compressed",
];

/// A file handed to the blob store for upload.
#[derive(Debug, Clone)]
pub struct FileUpload {
    /// Original file name.
    pub name: String,
    /// Declared MIME type.
    pub content_type: String,
    /// Raw content.
    pub bytes: Vec<u8>,
}

/// Result of uploading a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResult {
    /// Download URL.
    pub url: String,
    /// Sanitized stored name.
    pub name: String,
}

/// Outcome of the pure upload-policy check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileCheck {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileCheck {
    fn ok() -> Self {
        Self { valid: true, error: None }
    }

    fn rejected(error: impl Into<String>) -> Self {
        Self { valid: false, error: Some(error.into()) }
    }
}

/// Check a file against the upload policy. Pure; no I/O.
pub fn validate_file(file: &FileUpload) -> FileCheck {
    if file.bytes.is_empty() {
        return FileCheck::rejected("No se seleccionó ningún archivo");
    }
    if file.bytes.len() as u64 > MAX_FILE_SIZE_BYTES {
        return FileCheck::rejected("El archivo excede el tamaño máximo de 10MB");
    }
    if !ALLOWED_CONTENT_TYPES.contains(&file.content_type.as_str()) {
        return FileCheck::rejected(
            "Tipo de archivo no permitido. Use PDF, Word, Excel, imágenes o archivos ZIP",
        );
    }
    FileCheck::ok()
}

/// Sanitize a file name for storage: lowercase, alphanumerics and dots
/// only, runs of other characters collapsed to one underscore.
pub fn sanitize_file_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_underscore = false;
    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() || c == '.' {
            out.push(c);
            last_was_underscore = false;
        } else if !last_was_underscore {
            out.push('_');
            last_was_underscore = true;
        }
    }
    out
}

/// Storage path for one activity's support files.
pub fn activity_supports_path(tenant: &hmh_core::TenantId, activity: &hmh_core::ActivityId) -> String {
    format!(
        "tenants/{}/activities/{}/supports",
        tenant.as_uuid(),
        activity.as_uuid()
    )
}

/// Abstract blob store: upload and delete, nothing else.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Validate and store a file under `path`, returning its URL and
    /// sanitized name.
    async fn upload(&self, file: &FileUpload, path: &str) -> Result<UploadResult, StoreError>;

    /// Delete a stored file by URL. Best-effort.
    async fn delete(&self, url: &str) -> Result<(), StoreError>;
}

/// In-memory blob store for tests and demos.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    files: tokio::sync::RwLock<std::collections::HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    /// Create an empty blob store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub async fn blob_count(&self) -> usize {
        self.files.read().await.len()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, file: &FileUpload, path: &str) -> Result<UploadResult, StoreError> {
        let check = validate_file(file);
        if let Some(error) = check.error {
            return Err(StoreError::Backend(error));
        }
        let name = sanitize_file_name(&file.name);
        let url = format!("memory://{path}/{name}");
        self.files.write().await.insert(url.clone(), file.bytes.clone());
        Ok(UploadResult { url, name })
    }

    async fn delete(&self, url: &str) -> Result<(), StoreError> {
        self.files.write().await.remove(url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf(name: &str, size: usize) -> FileUpload {
        FileUpload {
            name: name.to_string(),
            content_type: "application/pdf".to_string(),
            bytes: vec![0u8; size],
        }
    }

    #[test]
    fn test_valid_pdf_accepted() {
        assert!(validate_file(&pdf("informe.pdf", 1024)).valid);
    }

    #[test]
    fn test_empty_file_rejected() {
        let check = validate_file(&pdf("informe.pdf", 0));
        assert_eq!(check.error.as_deref(), Some("No se seleccionó ningún archivo"));
    }

    #[test]
    fn test_oversized_file_rejected() {
        let check = validate_file(&pdf("grande.pdf", (MAX_FILE_SIZE_BYTES + 1) as usize));
        assert_eq!(
            check.error.as_deref(),
            Some("El archivo excede el tamaño máximo de 10MB")
        );
    }

    #[test]
    fn test_disallowed_type_rejected() {
        let file = FileUpload {
            name: "script.sh".to_string(),
            content_type: "application/x-sh".to_string(),
            bytes: vec![1, 2, 3],
        };
        let check = validate_file(&file);
        assert!(!check.valid);
        assert!(check.error.unwrap().starts_with("Tipo de archivo no permitido"));
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("Informe Final (v2).pdf"), "informe_final_v2_.pdf");
        assert_eq!(sanitize_file_name("ACTA-2026.PDF"), "acta_2026.pdf");
        assert_eq!(sanitize_file_name("ya__limpio.png"), "ya_limpio.png");
    }

    #[tokio::test]
    async fn test_memory_upload_roundtrip() {
        let store = MemoryBlobStore::new();
        let result = store.upload(&pdf("Informe.pdf", 64), "tenants/t/activities/a/supports").await.unwrap();
        assert_eq!(result.name, "informe.pdf");
        assert!(result.url.starts_with("memory://"));
        assert_eq!(store.blob_count().await, 1);
        store.delete(&result.url).await.unwrap();
        assert_eq!(store.blob_count().await, 0);
    }

    #[tokio::test]
    async fn test_memory_upload_rejects_invalid() {
        let store = MemoryBlobStore::new();
        let err = store.upload(&pdf("vacio.pdf", 0), "p").await.unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
    }
}
