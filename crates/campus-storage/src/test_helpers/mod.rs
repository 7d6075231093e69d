//! Test helpers for gateway and service tests
//!
//! This module provides an in-memory `ObjectBackend` so the gateway and the
//! maintenance services can be tested without a running object store.

pub mod mock_backend;

pub use mock_backend::*;

use crate::StorageGateway;
use campus_core::GatewayConfig;
use std::sync::Arc;

pub fn test_gateway_config() -> GatewayConfig {
    GatewayConfig::new("minio.internal", 9000, false, "test-access", "test-secret")
}

/// An initialized gateway backed by the given mock
pub fn initialized_gateway(backend: Arc<MockBackend>) -> StorageGateway {
    let mut gateway = StorageGateway::new();
    let initialized = gateway.initialize_with_backend(test_gateway_config(), backend);
    assert!(initialized, "test gateway config must be valid");
    gateway
}
