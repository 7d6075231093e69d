use campus_core::models::VerificationReport;
use campus_storage::{parse_file_path, StorageGateway};
use futures::future::join_all;
use std::sync::Arc;

/// Checks stored references (URLs or bucket paths) against the live backend.
#[derive(Clone)]
pub struct IntegrityVerifier {
    gateway: Arc<StorageGateway>,
}

impl IntegrityVerifier {
    pub fn new(gateway: Arc<StorageGateway>) -> Self {
        Self { gateway }
    }

    /// `false` without touching the backend when the reference has no bucket
    /// or no object path.
    pub async fn verify_file_exists(&self, url: &str) -> bool {
        let parsed = parse_file_path(url);

        let Some(bucket) = parsed.bucket.as_deref() else {
            tracing::debug!(url = %url, "No bucket in stored reference");
            return false;
        };
        if parsed.path.is_empty() {
            tracing::debug!(url = %url, "No object path in stored reference");
            return false;
        }

        self.gateway.file_exists(bucket, &parsed.path).await
    }

    /// Check every reference concurrently. `missing_urls` keeps input order.
    #[tracing::instrument(skip(self, urls), fields(total = urls.len()))]
    pub async fn batch_verify_files(&self, urls: &[String]) -> VerificationReport {
        let results = join_all(urls.iter().map(|url| self.verify_file_exists(url))).await;

        let missing_urls: Vec<String> = urls
            .iter()
            .zip(&results)
            .filter(|(_, exists)| !**exists)
            .map(|(url, _)| url.clone())
            .collect();

        let report = VerificationReport {
            total: urls.len(),
            existing: urls.len() - missing_urls.len(),
            missing: missing_urls.len(),
            missing_urls,
        };

        if report.missing > 0 {
            tracing::warn!(
                existing = report.existing,
                missing = report.missing,
                "Stored references point at missing objects"
            );
        } else {
            tracing::info!(existing = report.existing, "All stored references verified");
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_storage::test_helpers::{initialized_gateway, MockBackend};

    fn verifier(backend: Arc<MockBackend>) -> IntegrityVerifier {
        IntegrityVerifier::new(Arc::new(initialized_gateway(backend)))
    }

    #[tokio::test]
    async fn test_verify_full_url_and_bare_path() {
        let backend = Arc::new(MockBackend::with_buckets(&["profiles"]));
        backend.insert_object("profiles", "12/photo.png", 8, None);
        let verifier = verifier(backend);

        assert!(
            verifier
                .verify_file_exists("http://minio.internal:9000/profiles/12/photo.png")
                .await
        );
        assert!(verifier.verify_file_exists("profiles/12/photo.png").await);
        assert!(!verifier.verify_file_exists("profiles/12/other.png").await);
    }

    #[tokio::test]
    async fn test_unresolvable_references_skip_the_backend() {
        let backend = Arc::new(MockBackend::with_buckets(&["profiles"]));
        let verifier = verifier(backend.clone());

        assert!(!verifier.verify_file_exists("photo.png").await);
        assert!(!verifier.verify_file_exists("").await);
        assert!(!verifier.verify_file_exists("profiles/").await);
        assert_eq!(backend.stat_calls(), 0);
    }

    #[tokio::test]
    async fn test_batch_verify_counts_and_order() {
        let backend = Arc::new(MockBackend::with_buckets(&["gallery", "uploads"]));
        backend.insert_object("gallery", "2024/01/a.png", 1, None);
        backend.insert_object("uploads", "2024/01/csv/b.csv", 1, None);
        let verifier = verifier(backend);

        let urls = vec![
            "gallery/2024/01/missing-1.png".to_string(),
            "http://minio.internal:9000/gallery/2024/01/a.png".to_string(),
            "no-bucket.png".to_string(),
            "uploads/2024/01/csv/b.csv".to_string(),
        ];

        let report = verifier.batch_verify_files(&urls).await;
        assert_eq!(report.total, 4);
        assert_eq!(report.existing, 2);
        assert_eq!(report.missing, 2);
        assert_eq!(report.total, report.existing + report.missing);
        assert_eq!(
            report.missing_urls,
            vec!["gallery/2024/01/missing-1.png", "no-bucket.png"]
        );
    }

    #[tokio::test]
    async fn test_batch_verify_empty_input() {
        let verifier = verifier(Arc::new(MockBackend::new()));
        let report = verifier.batch_verify_files(&[]).await;
        assert_eq!(report, VerificationReport::default());
    }
}
