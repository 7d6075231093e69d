#[cfg(feature = "storage-s3")]
use crate::S3Backend;
use crate::{ObjectBackend, StorageResult};
use campus_core::GatewayConfig;
use std::sync::Arc;

/// Create the object backend for a gateway configuration
#[cfg(feature = "storage-s3")]
pub fn create_backend(config: &GatewayConfig) -> StorageResult<Arc<dyn ObjectBackend>> {
    let backend = S3Backend::new(config)?;
    tracing::debug!(endpoint = %backend.endpoint_url(), "Created S3 object backend");
    Ok(Arc::new(backend))
}

#[cfg(not(feature = "storage-s3"))]
pub fn create_backend(_config: &GatewayConfig) -> StorageResult<Arc<dyn ObjectBackend>> {
    Err(crate::StorageError::Configuration(
        "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
    ))
}

#[cfg(all(test, feature = "storage-s3"))]
mod tests {
    use super::*;
    use crate::StorageError;

    #[test]
    fn test_create_backend_propagates_config_errors() {
        let config = GatewayConfig::new("minio", 9000, false, "", "");
        assert!(matches!(
            create_backend(&config),
            Err(StorageError::Configuration(_))
        ));
    }
}
