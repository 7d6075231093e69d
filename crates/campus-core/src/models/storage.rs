//! Object-level models: what the backend reports and what uploads return.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An object as reported by the backend listing.
///
/// Owned by the backend; never cached beyond a single call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub bucket: String,
    pub key: String,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
    pub etag: Option<String>,
}

/// Metadata returned by a single-object probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectStat {
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
    pub etag: Option<String>,
    pub content_type: Option<String>,
}

/// Returned to the caller after a successful upload. The caller persists it;
/// this layer keeps no index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub url: String,
    pub key: String,
    pub etag: String,
}

/// A stored reference (URL or path) decomposed into bucket and key parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedPath {
    pub bucket: Option<String>,
    pub path: String,
    pub filename: String,
    /// Parent of `path`, empty rather than "." at the top level
    pub directory: String,
}
