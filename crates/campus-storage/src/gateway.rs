//! Storage gateway
//!
//! Owns the backend handle and configuration. Constructed once at startup,
//! initialized, then shared behind an `Arc` with every collaborator that
//! needs storage. Initialization takes `&mut self`, so callers serialize it
//! by construction.

use crate::factory::create_backend;
use crate::keys::{generate_path, PathContext};
use crate::policy::public_read_policy;
use crate::traits::{ObjectBackend, ObjectStream, StorageError, StorageResult};
use bytes::Bytes;
use campus_core::models::{ObjectStat, UploadResult};
use campus_core::{get_file_info, validate_file_size, BucketKind, GatewayConfig};
use chrono::Utc;
use futures::TryStreamExt;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

const UPLOADED_AT_METADATA: &str = "uploaded-at";

struct GatewayState {
    config: GatewayConfig,
    backend: Arc<dyn ObjectBackend>,
}

/// Lifecycle state reported to the hosting process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayStatus {
    Uninitialized,
    Ready { endpoint: String },
}

#[derive(Default)]
pub struct StorageGateway {
    state: Option<GatewayState>,
}

impl StorageGateway {
    /// A gateway in the uninitialized state
    pub fn new() -> Self {
        Self { state: None }
    }

    /// Build the S3 backend from `config` and switch to the initialized state.
    ///
    /// Never fails hard: on any construction error the gateway is left
    /// uninitialized and `false` is returned, so the host can still boot and
    /// report storage as unavailable. Re-initialization replaces the previous
    /// configuration and client wholesale.
    pub fn initialize(&mut self, config: GatewayConfig) -> bool {
        match create_backend(&config) {
            Ok(backend) => self.initialize_with_backend(config, backend),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    endpoint = %config.endpoint,
                    "Failed to initialize storage gateway"
                );
                self.state = None;
                false
            }
        }
    }

    /// Initialize against an already constructed backend.
    pub fn initialize_with_backend(
        &mut self,
        config: GatewayConfig,
        backend: Arc<dyn ObjectBackend>,
    ) -> bool {
        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Invalid storage gateway configuration");
            self.state = None;
            return false;
        }

        tracing::info!(
            endpoint = %config.endpoint_url(),
            public_base_url = %config.public_base_url(),
            "Storage gateway initialized"
        );
        self.state = Some(GatewayState { config, backend });
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    pub fn status(&self) -> GatewayStatus {
        match &self.state {
            Some(state) => GatewayStatus::Ready {
                endpoint: state.config.endpoint_url(),
            },
            None => GatewayStatus::Uninitialized,
        }
    }

    pub fn config(&self) -> Option<&GatewayConfig> {
        self.state.as_ref().map(|s| &s.config)
    }

    fn state(&self) -> StorageResult<&GatewayState> {
        self.state.as_ref().ok_or_else(StorageError::not_configured)
    }

    /// Create every managed bucket that is missing and attach the public-read
    /// policy to it.
    ///
    /// Buckets are provisioned one after another; a failure on one is logged
    /// and the next is still attempted. Returns `false` only when the gateway
    /// is not initialized.
    ///
    /// Existing buckets are left untouched, including their policy. A bucket
    /// created by a pass whose policy attachment then failed stays without the
    /// public-read policy until it is attached out of band.
    #[tracing::instrument(skip(self))]
    pub async fn ensure_buckets_exist(&self) -> bool {
        let state = match self.state() {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping bucket provisioning");
                return false;
            }
        };

        for kind in BucketKind::ALL {
            let bucket = kind.bucket_name();
            match Self::provision_bucket(state, bucket).await {
                Ok(true) => tracing::info!(bucket = %bucket, "Created bucket with public-read policy"),
                Ok(false) => tracing::debug!(bucket = %bucket, "Bucket already exists"),
                Err(e) => tracing::error!(
                    error = %e,
                    bucket = %bucket,
                    "Failed to provision bucket"
                ),
            }
        }

        true
    }

    /// Returns whether the bucket had to be created.
    async fn provision_bucket(state: &GatewayState, bucket: &str) -> StorageResult<bool> {
        if state.backend.bucket_exists(bucket).await? {
            return Ok(false);
        }

        state
            .backend
            .make_bucket(bucket, &state.config.region)
            .await?;
        state
            .backend
            .set_bucket_policy(bucket, &public_read_policy(bucket))
            .await?;

        Ok(true)
    }

    /// Upload an object under an explicit key.
    ///
    /// The bucket must already exist. Backend failures are returned as
    /// `UploadFailed` naming the key.
    pub async fn upload_file(
        &self,
        bucket: &str,
        key: &str,
        data: impl Into<Bytes>,
        content_type: &str,
    ) -> StorageResult<UploadResult> {
        let state = self.state()?;
        let data = data.into();
        let size = data.len() as u64;
        let start = Instant::now();

        let exists = state.backend.bucket_exists(bucket).await.map_err(|e| {
            tracing::error!(error = %e, bucket = %bucket, key = %key, "Bucket lookup failed");
            StorageError::UploadFailed(format!("failed to upload {}: {}", key, e))
        })?;
        if !exists {
            return Err(StorageError::NotFound(format!(
                "bucket {} does not exist",
                bucket
            )));
        }

        let mut metadata = HashMap::new();
        metadata.insert(UPLOADED_AT_METADATA.to_string(), Utc::now().to_rfc3339());

        let output = state
            .backend
            .put_object(bucket, key, data, content_type, metadata)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Upload failed"
                );
                StorageError::UploadFailed(format!("failed to upload {}: {}", key, e))
            })?;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload successful"
        );

        Ok(UploadResult {
            url: render_public_url(&state.config, bucket, key),
            key: key.to_string(),
            etag: output.etag.unwrap_or_default(),
        })
    }

    /// Classify, size-check, key and upload a file into the bucket for `kind`.
    pub async fn upload_categorized(
        &self,
        kind: BucketKind,
        context: &PathContext,
        data: impl Into<Bytes>,
        max_size_mb: u64,
    ) -> StorageResult<UploadResult> {
        let data = data.into();
        let file_info = get_file_info(&context.original_filename);

        if !validate_file_size(data.len() as u64, max_size_mb) {
            return Err(StorageError::Validation(format!(
                "{} is {} bytes, over the {} MB limit",
                context.original_filename,
                data.len(),
                max_size_mb
            )));
        }

        let key = generate_path(kind, context)?;
        self.upload_file(kind.bucket_name(), &key, data, &file_info.mime_type)
            .await
    }

    /// Delete an object, returning the backend error on failure.
    pub async fn remove_file(&self, bucket: &str, key: &str) -> StorageResult<()> {
        let state = self.state()?;

        state.backend.remove_object(bucket, key).await.map_err(|e| {
            tracing::error!(error = %e, bucket = %bucket, key = %key, "Delete failed");
            StorageError::DeleteFailed(format!("failed to delete {}: {}", key, e))
        })?;

        tracing::info!(bucket = %bucket, key = %key, "Delete successful");
        Ok(())
    }

    /// Best-effort delete: `false` on any failure.
    pub async fn delete_file(&self, bucket: &str, key: &str) -> bool {
        match self.remove_file(bucket, key).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, bucket = %bucket, key = %key, "Ignoring delete failure");
                false
            }
        }
    }

    pub async fn get_presigned_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let state = self.state()?;
        state
            .backend
            .presigned_get_object(bucket, key, expires_in)
            .await
    }

    pub async fn stat_file(&self, bucket: &str, key: &str) -> StorageResult<ObjectStat> {
        let state = self.state()?;
        state.backend.stat_object(bucket, key).await
    }

    /// Metadata probe. Any error, including an uninitialized gateway, reads as
    /// "does not exist".
    pub async fn file_exists(&self, bucket: &str, key: &str) -> bool {
        match self.stat_file(bucket, key).await {
            Ok(_) => true,
            Err(StorageError::NotFound(_)) => false,
            Err(e) => {
                tracing::debug!(error = %e, bucket = %bucket, key = %key, "Existence check failed");
                false
            }
        }
    }

    /// Lazy recursive listing of `bucket`, optionally under `prefix`.
    pub fn list_objects(&self, bucket: &str, prefix: Option<&str>) -> StorageResult<ObjectStream> {
        let state = self.state()?;
        Ok(state.backend.list_objects(bucket, prefix, true))
    }

    /// Drain the listing and return every key.
    pub async fn list_files(&self, bucket: &str, prefix: Option<&str>) -> StorageResult<Vec<String>> {
        self.list_objects(bucket, prefix)?
            .map_ok(|object| object.key)
            .try_collect()
            .await
    }

    pub fn public_url(&self, bucket: &str, key: &str) -> StorageResult<String> {
        let state = self.state()?;
        Ok(render_public_url(&state.config, bucket, key))
    }
}

/// Key segments are percent-encoded so `parse_file_path` decodes the URL back
/// to the exact key.
fn render_public_url(config: &GatewayConfig, bucket: &str, key: &str) -> String {
    let encoded_key = key
        .split('/')
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join("/");
    format!("{}/{}/{}", config.public_base_url(), bucket, encoded_key)
}
