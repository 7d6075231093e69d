//! Campus Storage Library
//!
//! Object-storage organization for the school app: key generation, bucket
//! provisioning, and the `StorageGateway` every upload and maintenance path
//! goes through.
//!
//! # Bucket and key layout
//!
//! One bucket per content category (see `campus_core::BucketKind`):
//!
//! - **homepage**: `{category}/{filename}`
//! - **gallery**: `{yyyy}/{mm}/[{category}/]{filename}`
//! - **profiles**: `{user_id}/{filename}`
//! - **resources**: `class-{class_id}/subject-{subject_id}/{category}/{filename}`
//! - **uploads**: `{yyyy}/{mm}/{type}/{filename}`
//!
//! Filenames are `{epoch_millis}_{16 hex chars}_{sanitized name}{ext}`, so two
//! uploads of the same original file never share a key. Key generation lives
//! in the `keys` and `naming` modules.

pub mod factory;
pub mod gateway;
pub mod keys;
pub mod naming;
pub mod policy;
#[cfg(feature = "storage-s3")]
pub mod s3;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
pub mod traits;

// Re-export commonly used types
pub use factory::create_backend;
pub use gateway::{GatewayStatus, StorageGateway};
pub use keys::{
    generate_gallery_path, generate_homepage_path, generate_path, generate_profile_path,
    generate_resource_path, generate_upload_path, parse_file_path, PathContext,
};
pub use naming::{generate_unique_filename, sanitize_name};
#[cfg(feature = "storage-s3")]
pub use s3::S3Backend;
pub use traits::{ObjectBackend, ObjectStream, PutObjectOutput, StorageError, StorageResult};
