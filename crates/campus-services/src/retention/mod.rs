mod service;

pub use service::RetentionManager;
