mod service;

pub use service::AuditReporter;
