use campus_core::models::{AuditedFile, BucketAudit, BucketManifest, BucketStats};
use campus_core::BucketKind;
use campus_storage::{StorageError, StorageGateway, StorageResult};
use chrono::Utc;
use futures::TryStreamExt;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Lists bucket contents and summarizes them.
#[derive(Clone)]
pub struct AuditReporter {
    gateway: Arc<StorageGateway>,
}

impl AuditReporter {
    pub fn new(gateway: Arc<StorageGateway>) -> Self {
        Self { gateway }
    }

    /// Full listing of `bucket`. Listing failures come back in
    /// `BucketAudit::error` rather than as an `Err`.
    pub async fn audit_bucket(&self, bucket: &str) -> BucketAudit {
        match self.list_audited(bucket).await {
            Ok(files) => BucketAudit {
                bucket: bucket.to_string(),
                count: files.len(),
                files,
                error: None,
            },
            Err(e) => {
                tracing::error!(error = %e, bucket = %bucket, "Bucket audit failed");
                BucketAudit {
                    bucket: bucket.to_string(),
                    files: Vec::new(),
                    count: 0,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    async fn list_audited(&self, bucket: &str) -> StorageResult<Vec<AuditedFile>> {
        self.gateway
            .list_objects(bucket, None)?
            .map_ok(|object| AuditedFile {
                path: object.key,
                size: object.size,
                last_modified: object.last_modified,
            })
            .try_collect()
            .await
    }

    /// Statistics for every managed bucket, keyed by bucket name.
    #[tracing::instrument(skip(self))]
    pub async fn get_storage_stats(&self) -> BTreeMap<String, BucketStats> {
        let mut stats = BTreeMap::new();

        for kind in BucketKind::ALL {
            let audit = self.audit_bucket(kind.bucket_name()).await;
            stats.insert(audit.bucket.clone(), summarize(&audit));
        }

        tracing::info!(
            buckets = stats.len(),
            failed = stats.values().filter(|s| s.error.is_some()).count(),
            "Storage statistics collected"
        );

        stats
    }

    /// JSON manifest of `bucket` for offline backup planning.
    pub async fn export_bucket_manifest(&self, bucket: &str) -> StorageResult<String> {
        let audit = self.audit_bucket(bucket).await;
        if let Some(error) = audit.error {
            return Err(StorageError::Backend(format!(
                "cannot export manifest for {}: {}",
                bucket, error
            )));
        }

        let manifest = BucketManifest {
            bucket: audit.bucket,
            export_date: Utc::now(),
            file_count: audit.count,
            files: audit.files,
        };

        tracing::info!(bucket = %bucket, file_count = manifest.file_count, "Exported bucket manifest");
        Ok(serde_json::to_string_pretty(&manifest)?)
    }
}

fn summarize(audit: &BucketAudit) -> BucketStats {
    if let Some(error) = &audit.error {
        return BucketStats {
            error: Some(error.clone()),
            ..BucketStats::default()
        };
    }

    let dates = audit.files.iter().filter_map(|f| f.last_modified);

    BucketStats {
        file_count: audit.count,
        total_size: audit.files.iter().map(|f| f.size).sum(),
        oldest_file: dates.clone().min(),
        newest_file: dates.max(),
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_storage::test_helpers::{initialized_gateway, MockBackend};
    use chrono::TimeZone;

    fn reporter(backend: Arc<MockBackend>) -> AuditReporter {
        AuditReporter::new(Arc::new(initialized_gateway(backend)))
    }

    #[tokio::test]
    async fn test_audit_bucket_lists_every_object() {
        let backend = Arc::new(MockBackend::with_buckets(&["gallery"]));
        backend.insert_object("gallery", "2024/01/a.png", 10, None);
        backend.insert_object("gallery", "2024/02/sports/b.png", 20, None);

        let audit = reporter(backend).audit_bucket("gallery").await;
        assert!(audit.is_success());
        assert_eq!(audit.count, 2);
        assert_eq!(audit.files[1].path, "2024/02/sports/b.png");
        assert_eq!(audit.files[1].size, 20);
    }

    #[tokio::test]
    async fn test_audit_bucket_reports_failure_without_erroring() {
        let backend = Arc::new(MockBackend::with_buckets(&["gallery"]));
        backend.fail_list("gallery");

        let audit = reporter(backend).audit_bucket("gallery").await;
        assert!(!audit.is_success());
        assert_eq!(audit.count, 0);
        assert!(audit.files.is_empty());
    }

    #[tokio::test]
    async fn test_storage_stats_cover_all_buckets() {
        let backend = Arc::new(MockBackend::with_buckets(&[
            "homepage",
            "gallery",
            "profiles",
            "resources",
            "uploads",
        ]));
        let older = Utc.with_ymd_and_hms(2023, 5, 1, 0, 0, 0).unwrap();
        let newer = Utc.with_ymd_and_hms(2024, 8, 1, 0, 0, 0).unwrap();
        backend.insert_object("profiles", "1/a.png", 100, Some(newer));
        backend.insert_object("profiles", "2/b.png", 50, Some(older));
        backend.insert_object("profiles", "3/c.png", 5, None);
        backend.fail_list("uploads");

        let stats = reporter(backend).get_storage_stats().await;
        assert_eq!(stats.len(), 5);

        let profiles = &stats["profiles"];
        assert_eq!(profiles.file_count, 3);
        assert_eq!(profiles.total_size, 155);
        assert_eq!(profiles.oldest_file, Some(older));
        assert_eq!(profiles.newest_file, Some(newer));

        let empty = &stats["homepage"];
        assert_eq!(empty.file_count, 0);
        assert!(empty.error.is_none());

        let failed = &stats["uploads"];
        assert_eq!(failed.file_count, 0);
        assert_eq!(failed.total_size, 0);
        assert!(failed.error.is_some());
    }

    #[tokio::test]
    async fn test_export_manifest_json() {
        let backend = Arc::new(MockBackend::with_buckets(&["resources"]));
        let modified = Utc.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap();
        backend.insert_object("resources", "class-1/subject-2/notes/x.pdf", 42, Some(modified));

        let json = reporter(backend)
            .export_bucket_manifest("resources")
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["bucket"], "resources");
        assert_eq!(value["fileCount"], 1);
        assert!(value["exportDate"].is_string());
        assert_eq!(value["files"][0]["path"], "class-1/subject-2/notes/x.pdf");
        assert_eq!(value["files"][0]["size"], 42);
        assert_eq!(value["files"][0]["lastModified"], "2024-02-03T04:05:06Z");
    }

    #[tokio::test]
    async fn test_export_manifest_fails_when_listing_fails() {
        let backend = Arc::new(MockBackend::with_buckets(&["resources"]));
        backend.fail_list("resources");

        assert!(reporter(backend)
            .export_bucket_manifest("resources")
            .await
            .is_err());
    }
}
