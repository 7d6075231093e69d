//! File type classification
//!
//! Maps a filename extension to a MIME type and a coarse content category.
//! Classification is total: unknown extensions fall back to
//! `application/octet-stream` / `other`.

use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 5;
const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Coarse content category derived from the extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Image,
    Document,
    Video,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    /// Lowercased extension including the leading dot, empty if none
    pub extension: String,
    pub mime_type: String,
    pub category: FileCategory,
}

fn mime_type_for(extension: &str) -> Option<&'static str> {
    let mime = match extension {
        // Images
        ".jpg" | ".jpeg" => "image/jpeg",
        ".png" => "image/png",
        ".gif" => "image/gif",
        ".webp" => "image/webp",
        ".svg" => "image/svg+xml",
        ".bmp" => "image/bmp",
        ".ico" => "image/x-icon",
        // Documents
        ".pdf" => "application/pdf",
        ".doc" => "application/msword",
        ".docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ".xls" => "application/vnd.ms-excel",
        ".xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        ".ppt" => "application/vnd.ms-powerpoint",
        ".pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        ".txt" => "text/plain",
        ".csv" => "text/csv",
        // Videos
        ".mp4" => "video/mp4",
        ".webm" => "video/webm",
        ".mov" => "video/quicktime",
        ".avi" => "video/x-msvideo",
        _ => return None,
    };
    Some(mime)
}

fn category_for(extension: &str) -> Option<FileCategory> {
    let category = match extension {
        ".jpg" | ".jpeg" | ".png" | ".gif" | ".webp" | ".svg" | ".bmp" | ".ico" => {
            FileCategory::Image
        }
        ".pdf" | ".doc" | ".docx" | ".xls" | ".xlsx" | ".ppt" | ".pptx" | ".txt" | ".csv" => {
            FileCategory::Document
        }
        ".mp4" | ".webm" | ".mov" | ".avi" => FileCategory::Video,
        _ => return None,
    };
    Some(category)
}

/// Classify a filename by its extension.
pub fn get_file_info(filename: &str) -> FileInfo {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default();

    FileInfo {
        mime_type: mime_type_for(&extension)
            .unwrap_or(FALLBACK_MIME_TYPE)
            .to_string(),
        category: category_for(&extension).unwrap_or(FileCategory::Other),
        extension,
    }
}

/// Boundary-inclusive size check against a limit in megabytes.
pub fn validate_file_size(size: u64, max_size_mb: u64) -> bool {
    size <= max_size_mb.saturating_mul(1024 * 1024)
}
