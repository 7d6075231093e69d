mod service;

pub use service::IntegrityVerifier;
