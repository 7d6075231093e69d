//! Campus Core Library
//!
//! This crate provides the configuration, shared models, bucket catalogue,
//! file type classification, and error metadata used by the storage gateway
//! and the maintenance services.

pub mod config;
pub mod error;
pub mod file_types;
pub mod models;
pub mod storage_types;
pub mod telemetry;

// Re-export commonly used types
pub use config::{Config, GatewayConfig};
pub use error::{ErrorMetadata, LogLevel};
pub use file_types::{get_file_info, validate_file_size, FileCategory, FileInfo};
pub use storage_types::BucketKind;
