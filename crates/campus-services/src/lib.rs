//! Campus Services Layer
//!
//! Maintenance passes over the live object store: retention cleanup, bucket
//! audits and manifests, and verification of stored references. Each service
//! holds the shared `StorageGateway` and reads backend state directly; none
//! of them keeps an index of its own.

pub mod audit;
pub mod integrity;
pub mod retention;

pub use audit::AuditReporter;
pub use integrity::IntegrityVerifier;
pub use retention::RetentionManager;
