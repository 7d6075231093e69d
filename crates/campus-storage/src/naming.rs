//! Unique filename generation for object keys.
//!
//! Every generated filename embeds the epoch milliseconds and 8 random bytes
//! (hex encoded) so concurrent uploads of the same original name never share a
//! key.

use chrono::Utc;
use std::path::Path;

const MAX_NAME_LENGTH: usize = 100;
const RANDOM_BYTES: usize = 8;

/// Reduce a user-supplied name to `[a-z0-9._-]`.
///
/// Lowercases, replaces every other character with `_`, collapses runs of
/// `_`, trims `_` from both ends, and truncates to 100 characters.
/// Idempotent.
pub fn sanitize_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());

    for c in raw.to_lowercase().chars() {
        let mapped = if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-' {
            c
        } else {
            '_'
        };
        if mapped == '_' && out.ends_with('_') {
            continue;
        }
        out.push(mapped);
    }

    // Only ASCII remains, so byte truncation is char truncation.
    let trimmed = out.trim_matches('_');
    let truncated = &trimmed[..trimmed.len().min(MAX_NAME_LENGTH)];
    truncated.trim_end_matches('_').to_string()
}

/// Split a filename into (stem, extension-with-dot). The extension keeps its
/// original case.
fn split_extension(original: &str) -> (String, String) {
    let path = Path::new(original);
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            (stem, format!(".{}", ext))
        }
        None => (original.to_string(), String::new()),
    }
}

fn random_suffix() -> String {
    let bytes: [u8; RANDOM_BYTES] = rand::random();
    hex::encode(bytes)
}

/// Build `<epoch-millis>_<16 hex chars>_<sanitized-base>[ext]`.
///
/// With `preserve_extension` the extension is split off first and appended
/// verbatim (case included); otherwise the whole name is sanitized.
pub fn generate_unique_filename(original: &str, preserve_extension: bool) -> String {
    let (base, extension) = if preserve_extension {
        split_extension(original)
    } else {
        (original.to_string(), String::new())
    };

    format!(
        "{}_{}_{}{}",
        Utc::now().timestamp_millis(),
        random_suffix(),
        sanitize_name(&base),
        extension
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use std::collections::HashSet;

    #[test]
    fn test_sanitize_name_basic() {
        assert_eq!(sanitize_name("My Report (Final).PDF"), "my_report_final_.pdf");
        assert_eq!(sanitize_name("__hello   world__"), "hello_world");
        assert_eq!(sanitize_name("Résumé 2024"), "r_sum_2024");
        assert_eq!(sanitize_name(""), "");
        assert_eq!(sanitize_name("___"), "");
    }

    #[test]
    fn test_sanitize_name_truncates() {
        let long = "a".repeat(250);
        assert_eq!(sanitize_name(&long).len(), 100);

        // A separator landing on the cut must not survive as a trailing `_`.
        let edge = format!("{} tail", "b".repeat(100));
        let sanitized = sanitize_name(&edge);
        assert!(!sanitized.ends_with('_'));
        assert!(sanitized.len() <= 100);
    }

    #[test]
    fn test_sanitize_name_is_idempotent() {
        let samples = [
            "Simple.png",
            "  spaces  everywhere  ",
            "UPPER_and_lower",
            "ünïcödé ✓ stuff",
            "a/b\\c:d*e?f\"g<h>i|j",
            "--dashes--and..dots..",
            "_leading",
            "trailing_",
            &"x_".repeat(80),
            &format!("{}!{}", "y".repeat(99), "z".repeat(10)),
        ];
        for sample in samples {
            let once = sanitize_name(sample);
            assert_eq!(sanitize_name(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn test_unique_filename_format() {
        let pattern = Regex::new(r"^\d+_[0-9a-f]{16}_.*$").unwrap();
        let name = generate_unique_filename("Class Photo.PNG", true);
        assert!(pattern.is_match(&name), "{name}");
        assert!(name.ends_with("_class_photo.PNG"), "{name}");
    }

    #[test]
    fn test_unique_filename_without_extension_preservation() {
        let name = generate_unique_filename("Notes.TXT", false);
        assert!(name.ends_with("_notes.txt"), "{name}");
    }

    #[test]
    fn test_unique_filename_empty_input() {
        let pattern = Regex::new(r"^\d+_[0-9a-f]{16}_$").unwrap();
        let name = generate_unique_filename("", true);
        assert!(pattern.is_match(&name), "{name}");
    }

    #[test]
    fn test_unique_filename_never_repeats() {
        let names: HashSet<String> = (0..10_000)
            .map(|_| generate_unique_filename("same.png", true))
            .collect();
        assert_eq!(names.len(), 10_000);
    }
}
