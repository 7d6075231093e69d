use campus_core::models::{CleanupPaths, CleanupReport, StoredObject};
use campus_core::BucketKind;
use campus_storage::{StorageGateway, StorageResult};
use chrono::{DateTime, Datelike, Duration, Utc};
use futures::{future, TryStreamExt};
use std::sync::Arc;

/// Whole years scanned before the cutoff year in date-organized buckets.
const PRECEDING_YEARS: i32 = 10;

/// Deletes objects older than a retention window.
#[derive(Clone)]
pub struct RetentionManager {
    gateway: Arc<StorageGateway>,
}

impl RetentionManager {
    pub fn new(gateway: Arc<StorageGateway>) -> Self {
        Self { gateway }
    }

    /// Delete every object in `bucket` last modified strictly before
    /// `now - older_than_days`.
    ///
    /// Objects without a last-modified time are kept. Deletes run one at a
    /// time and a failed delete is recorded in the report instead of stopping
    /// the pass. A failed listing is returned as an error.
    #[tracing::instrument(skip(self), fields(cleanup.operation = "full_scan"))]
    pub async fn cleanup_old_files(
        &self,
        bucket: &str,
        older_than_days: u32,
    ) -> StorageResult<CleanupReport> {
        let cutoff = cutoff_date(Utc::now(), older_than_days);
        let stale = self.collect_stale(bucket, None, cutoff).await?;
        Ok(self.delete_objects(bucket, stale).await)
    }

    /// Like `cleanup_old_files`, but lists only the prefixes from
    /// `generate_cleanup_paths` when the bucket is date-organized.
    #[tracing::instrument(skip(self), fields(cleanup.operation = "prefix_scan"))]
    pub async fn cleanup_old_files_scoped(
        &self,
        bucket: &str,
        older_than_days: u32,
    ) -> StorageResult<CleanupReport> {
        let paths = self.generate_cleanup_paths(bucket, older_than_days);

        if paths.search_prefixes.is_empty() {
            tracing::debug!(bucket = %bucket, "No date layout, falling back to full scan");
            let stale = self.collect_stale(bucket, None, paths.cutoff_date).await?;
            return Ok(self.delete_objects(bucket, stale).await);
        }

        let mut stale = Vec::new();
        for prefix in &paths.search_prefixes {
            stale.extend(
                self.collect_stale(bucket, Some(prefix), paths.cutoff_date)
                    .await?,
            );
        }

        Ok(self.delete_objects(bucket, stale).await)
    }

    /// Key prefixes covering everything that can be older than the cutoff.
    pub fn generate_cleanup_paths(&self, bucket: &str, older_than_days: u32) -> CleanupPaths {
        cleanup_paths_at(bucket, older_than_days, Utc::now())
    }

    async fn collect_stale(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        cutoff: DateTime<Utc>,
    ) -> StorageResult<Vec<StoredObject>> {
        self.gateway
            .list_objects(bucket, prefix)?
            .try_filter(|object| future::ready(is_stale(object, cutoff)))
            .try_collect()
            .await
    }

    async fn delete_objects(&self, bucket: &str, objects: Vec<StoredObject>) -> CleanupReport {
        let mut report = CleanupReport::default();

        for object in objects {
            tracing::debug!(
                bucket = %bucket,
                key = %object.key,
                last_modified = ?object.last_modified,
                "Deleting expired object"
            );

            match self.gateway.remove_file(bucket, &object.key).await {
                Ok(()) => report.deleted += 1,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        bucket = %bucket,
                        key = %object.key,
                        "Failed to delete expired object, continuing"
                    );
                    report.errors.push(format!("{}: {}", object.key, e));
                }
            }
        }

        tracing::info!(
            bucket = %bucket,
            deleted = report.deleted,
            failed = report.errors.len(),
            "Retention cleanup completed"
        );

        report
    }
}

/// Clamped to the earliest representable instant, which selects nothing.
fn cutoff_date(now: DateTime<Utc>, older_than_days: u32) -> DateTime<Utc> {
    now.checked_sub_signed(Duration::days(i64::from(older_than_days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn is_stale(object: &StoredObject, cutoff: DateTime<Utc>) -> bool {
    object
        .last_modified
        .is_some_and(|modified| modified < cutoff)
}

/// Prefixes for date-organized buckets: `YYYY/MM/` for each month of the
/// cutoff year up to the cutoff month, then `YYYY/` for the preceding years.
pub(crate) fn cleanup_paths_at(
    bucket: &str,
    older_than_days: u32,
    now: DateTime<Utc>,
) -> CleanupPaths {
    let cutoff = cutoff_date(now, older_than_days);
    let date_organized = BucketKind::from_bucket_name(bucket).is_some_and(|k| k.is_date_organized());

    let search_prefixes = if date_organized && cutoff > DateTime::<Utc>::MIN_UTC {
        let year = cutoff.year();
        (1..=cutoff.month())
            .map(|month| format!("{}/{:02}/", year, month))
            .chain((1..=PRECEDING_YEARS).map(|back| format!("{}/", year - back)))
            .collect()
    } else {
        Vec::new()
    };

    CleanupPaths {
        cutoff_date: cutoff,
        search_prefixes,
    }
}
