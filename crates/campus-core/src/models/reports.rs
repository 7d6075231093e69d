//! Report models produced by the retention, audit, and verification passes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a retention pass. Per-object failures are collected, not raised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupReport {
    pub deleted: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl CleanupReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Key prefixes that narrow a retention listing.
///
/// An empty `search_prefixes` means the bucket has no date structure and the
/// caller must scan the whole bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupPaths {
    pub cutoff_date: DateTime<Utc>,
    pub search_prefixes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditedFile {
    pub path: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

/// Full listing of one bucket. A failed listing is reported through `error`
/// so batch callers can keep going.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketAudit {
    pub bucket: String,
    pub files: Vec<AuditedFile>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BucketAudit {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate statistics for one bucket.
///
/// A bucket whose audit failed carries zero counts and an `error`, so a
/// failure stays distinguishable from an empty bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketStats {
    pub file_count: usize,
    pub total_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_file: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_file: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Portable snapshot of a bucket listing for offline backup planning.
///
/// ETags and content types are intentionally absent; the manifest is not a
/// restore format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketManifest {
    pub bucket: String,
    pub export_date: DateTime<Utc>,
    pub file_count: usize,
    pub files: Vec<AuditedFile>,
}

/// Result of checking many stored references. `total == existing + missing`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub total: usize,
    pub existing: usize,
    pub missing: usize,
    /// Failing references in their original input order
    pub missing_urls: Vec<String>,
}
