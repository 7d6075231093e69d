//! Object key generation per content category.
//!
//! Every scheme funnels through `naming::generate_unique_filename`, so key
//! uniqueness is uniform across buckets. Category labels are checked against a
//! closed allow-list and fall back to a fixed folder instead of rejecting the
//! upload. The bucket is applied by the caller; keys are relative and never
//! start with `/`.
//!
//! | Bucket   | Key layout                                                      |
//! |----------|-----------------------------------------------------------------|
//! | homepage | `{category}/{file}`                                             |
//! | gallery  | `{yyyy}/{mm}/[{category}/]{file}`                               |
//! | profiles | `{user_id}/{file}`                                              |
//! | resources| `class-{class_id}/subject-{subject_id}/{category}/{file}`       |
//! | uploads  | `{yyyy}/{mm}/{type}/{file}`                                     |

use crate::naming::{generate_unique_filename, sanitize_name};
use crate::traits::{StorageError, StorageResult};
use campus_core::models::ParsedPath;
use campus_core::BucketKind;
use chrono::{DateTime, Datelike, Utc};

pub const HOMEPAGE_CATEGORIES: &[&str] = &["hero", "featured", "about", "slider"];
pub const RESOURCE_CATEGORIES: &[&str] = &["past-papers", "notes", "assignments", "textbooks"];
pub const UPLOAD_TYPES: &[&str] = &["documents", "csv", "reports", "signatures"];

const HOMEPAGE_FALLBACK: &str = "general";
const RESOURCE_FALLBACK: &str = "general";
const UPLOAD_FALLBACK: &str = "misc";

/// Identifiers a path scheme may draw on. Which fields are required depends on
/// the scheme.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathContext {
    pub original_filename: String,
    pub user_id: Option<String>,
    pub class_id: Option<String>,
    pub subject_id: Option<String>,
    pub category: Option<String>,
    /// Upload type for the general uploads bucket
    pub file_type: Option<String>,
}

impl PathContext {
    pub fn new(original_filename: impl Into<String>) -> Self {
        Self {
            original_filename: original_filename.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_user_id(mut self, user_id: impl ToString) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    #[must_use]
    pub fn with_class_id(mut self, class_id: impl ToString) -> Self {
        self.class_id = Some(class_id.to_string());
        self
    }

    #[must_use]
    pub fn with_subject_id(mut self, subject_id: impl ToString) -> Self {
        self.subject_id = Some(subject_id.to_string());
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn with_file_type(mut self, file_type: impl Into<String>) -> Self {
        self.file_type = Some(file_type.into());
        self
    }
}

fn allowed_or<'a>(value: Option<&'a str>, allowed: &[&str], fallback: &'a str) -> &'a str {
    match value {
        Some(v) if allowed.iter().any(|a| *a == v) => v,
        _ => fallback,
    }
}

fn required<'a>(value: &'a Option<String>, field: &str, scheme: &str) -> StorageResult<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| StorageError::Validation(format!("{} is required for {} paths", field, scheme)))
}

fn year_month(date: DateTime<Utc>) -> (i32, String) {
    (date.year(), format!("{:02}", date.month()))
}

pub fn generate_homepage_path(context: &PathContext) -> String {
    let category = allowed_or(
        context.category.as_deref(),
        HOMEPAGE_CATEGORIES,
        HOMEPAGE_FALLBACK,
    );
    format!(
        "{}/{}",
        category,
        generate_unique_filename(&context.original_filename, true)
    )
}

pub fn generate_gallery_path(context: &PathContext) -> String {
    generate_gallery_path_at(context, Utc::now())
}

pub fn generate_gallery_path_at(context: &PathContext, date: DateTime<Utc>) -> String {
    let (year, month) = year_month(date);
    let filename = generate_unique_filename(&context.original_filename, true);

    // A label that sanitizes to nothing is treated as absent.
    match context
        .category
        .as_deref()
        .map(sanitize_name)
        .filter(|c| !c.is_empty())
    {
        Some(category) => format!("{}/{}/{}/{}", year, month, category, filename),
        None => format!("{}/{}/{}", year, month, filename),
    }
}

pub fn generate_profile_path(context: &PathContext) -> StorageResult<String> {
    let user_id = required(&context.user_id, "userId", "profile")?;
    Ok(format!(
        "{}/{}",
        user_id,
        generate_unique_filename(&context.original_filename, true)
    ))
}

pub fn generate_resource_path(context: &PathContext) -> StorageResult<String> {
    let class_id = required(&context.class_id, "classId", "study resource")?;
    let subject_id = required(&context.subject_id, "subjectId", "study resource")?;
    let category = allowed_or(
        context.category.as_deref(),
        RESOURCE_CATEGORIES,
        RESOURCE_FALLBACK,
    );
    Ok(format!(
        "class-{}/subject-{}/{}/{}",
        class_id,
        subject_id,
        category,
        generate_unique_filename(&context.original_filename, true)
    ))
}

pub fn generate_upload_path(context: &PathContext) -> String {
    generate_upload_path_at(context, Utc::now())
}

pub fn generate_upload_path_at(context: &PathContext, date: DateTime<Utc>) -> String {
    let (year, month) = year_month(date);
    let file_type = allowed_or(context.file_type.as_deref(), UPLOAD_TYPES, UPLOAD_FALLBACK);
    format!(
        "{}/{}/{}/{}",
        year,
        month,
        file_type,
        generate_unique_filename(&context.original_filename, true)
    )
}

/// Generate a key for the given bucket's scheme.
pub fn generate_path(kind: BucketKind, context: &PathContext) -> StorageResult<String> {
    match kind {
        BucketKind::Homepage => Ok(generate_homepage_path(context)),
        BucketKind::Gallery => Ok(generate_gallery_path(context)),
        BucketKind::Profile => generate_profile_path(context),
        BucketKind::Resource => generate_resource_path(context),
        BucketKind::Upload => Ok(generate_upload_path(context)),
    }
}

/// Decompose a stored reference into bucket, key, filename, and directory.
///
/// A full URL loses its scheme, host, query, and fragment, and its path is
/// percent-decoded. The first segment is the bucket when more segments follow.
pub fn parse_file_path(url_or_path: &str) -> ParsedPath {
    let raw_path = match url_or_path.find("://") {
        Some(idx) => {
            let after_scheme = &url_or_path[idx + 3..];
            let path = after_scheme
                .find('/')
                .map(|slash| &after_scheme[slash..])
                .unwrap_or("");
            let path = path.split(['?', '#']).next().unwrap_or("");
            urlencoding::decode(path)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| path.to_string())
        }
        None => url_or_path.to_string(),
    };

    let trimmed = raw_path.trim_start_matches('/');

    let (bucket, path) = match trimmed.split_once('/') {
        Some((bucket, rest)) if !bucket.is_empty() => (Some(bucket.to_string()), rest.to_string()),
        _ => (None, trimmed.to_string()),
    };

    let (directory, filename) = match path.rsplit_once('/') {
        Some((dir, file)) => (dir.to_string(), file.to_string()),
        None => (String::new(), path.clone()),
    };

    ParsedPath {
        bucket,
        path,
        filename,
        directory,
    }
}
