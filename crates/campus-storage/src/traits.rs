//! Storage errors and the object-backend abstraction
//!
//! `ObjectBackend` is the S3-compatible surface the gateway consumes. The
//! production implementation talks to the backend through `aws-sdk-s3`; tests
//! use the in-memory backend from `test_helpers`.

use async_trait::async_trait;
use bytes::Bytes;
use campus_core::models::{ObjectStat, StoredObject};
use campus_core::{ErrorMetadata, LogLevel};
use futures::Stream;
use std::collections::HashMap;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    pub(crate) fn not_configured() -> Self {
        StorageError::Configuration("storage not configured".to_string())
    }
}

impl ErrorMetadata for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            StorageError::Configuration(_) => "STORAGE_NOT_CONFIGURED",
            StorageError::Validation(_) => "VALIDATION_ERROR",
            StorageError::NotFound(_) => "NOT_FOUND",
            StorageError::UploadFailed(_) => "UPLOAD_FAILED",
            StorageError::DeleteFailed(_) => "DELETE_FAILED",
            StorageError::Backend(_) => "STORAGE_BACKEND_ERROR",
            StorageError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StorageError::UploadFailed(_) | StorageError::DeleteFailed(_) | StorageError::Backend(_)
        )
    }

    fn log_level(&self) -> LogLevel {
        match self {
            StorageError::Validation(_) => LogLevel::Debug,
            StorageError::NotFound(_) | StorageError::Configuration(_) => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Lazy, finite listing. Drain it or drop it; a fresh call re-lists from the
/// beginning.
pub type ObjectStream = Pin<Box<dyn Stream<Item = StorageResult<StoredObject>> + Send>>;

/// Object written by `put_object`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObjectOutput {
    pub etag: Option<String>,
}

/// S3-compatible backend operations consumed by the gateway
#[async_trait]
pub trait ObjectBackend: Send + Sync {
    async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool>;

    async fn make_bucket(&self, bucket: &str, region: &str) -> StorageResult<()>;

    /// Attach a JSON policy document to the bucket
    async fn set_bucket_policy(&self, bucket: &str, policy: &str) -> StorageResult<()>;

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
        metadata: HashMap<String, String>,
    ) -> StorageResult<PutObjectOutput>;

    async fn remove_object(&self, bucket: &str, key: &str) -> StorageResult<()>;

    /// Metadata probe; a missing object is `StorageError::NotFound`
    async fn stat_object(&self, bucket: &str, key: &str) -> StorageResult<ObjectStat>;

    /// List objects, optionally under `prefix`. Non-recursive listings stop at
    /// the next `/`.
    fn list_objects(&self, bucket: &str, prefix: Option<&str>, recursive: bool) -> ObjectStream;

    async fn presigned_get_object(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;
}
