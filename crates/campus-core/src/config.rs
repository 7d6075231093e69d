//! Configuration module
//!
//! This module provides the object-storage gateway configuration and the
//! maintenance settings used by the retention, audit, and upload paths.

use std::env;
use std::fmt;

const DEFAULT_PORT: u16 = 9000;
const DEFAULT_REGION: &str = "us-east-1";
const RETENTION_DAYS: u32 = 90;
const MAX_UPLOAD_SIZE_MB: u64 = 5;
const PRESIGNED_URL_EXPIRY_SECS: u64 = 3600;

/// Connection settings for the S3-compatible backend.
///
/// Captured once when the gateway is initialized. Re-initialization replaces
/// the whole value; there is no partial update.
#[derive(Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub endpoint: String,
    pub port: u16,
    pub use_ssl: bool,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    // The backend may be reachable internally on a different address than
    // the one clients use, so URL rendering has its own host/port.
    pub public_endpoint: Option<String>,
    pub public_port: Option<u16>,
}

impl GatewayConfig {
    pub fn new(
        endpoint: impl Into<String>,
        port: u16,
        use_ssl: bool,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            port,
            use_ssl,
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            region: DEFAULT_REGION.to_string(),
            public_endpoint: None,
            public_port: None,
        }
    }

    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    #[must_use]
    pub fn with_public_endpoint(mut self, endpoint: impl Into<String>, port: Option<u16>) -> Self {
        self.public_endpoint = Some(endpoint.into());
        self.public_port = port;
        self
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_source(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_source<F>(get: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = get("STORAGE_ENDPOINT")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("STORAGE_ENDPOINT must be set"))?;

        let port = match get("STORAGE_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("STORAGE_PORT must be a valid port number"))?,
            None => DEFAULT_PORT,
        };

        let use_ssl = get("STORAGE_USE_SSL")
            .unwrap_or_else(|| "false".to_string())
            .to_lowercase()
            .parse()
            .unwrap_or(false);

        let public_port = match get("STORAGE_PUBLIC_PORT").filter(|s| !s.is_empty()) {
            Some(raw) => Some(
                raw.trim()
                    .parse()
                    .map_err(|_| anyhow::anyhow!("STORAGE_PUBLIC_PORT must be a valid port number"))?,
            ),
            None => None,
        };

        let config = GatewayConfig {
            endpoint: endpoint.trim().to_string(),
            port,
            use_ssl,
            access_key: get("STORAGE_ACCESS_KEY").unwrap_or_default(),
            secret_key: get("STORAGE_SECRET_KEY").unwrap_or_default(),
            region: get("STORAGE_REGION")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            public_endpoint: get("STORAGE_PUBLIC_ENDPOINT").filter(|s| !s.is_empty()),
            public_port,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.endpoint.trim().is_empty() {
            return Err(anyhow::anyhow!("storage endpoint must not be empty"));
        }

        if self.endpoint.contains("://") {
            return Err(anyhow::anyhow!(
                "storage endpoint must be a host name without a scheme (got {})",
                self.endpoint
            ));
        }

        if self.port == 0 {
            return Err(anyhow::anyhow!("storage port must be greater than 0"));
        }

        if self.access_key.is_empty() || self.secret_key.is_empty() {
            return Err(anyhow::anyhow!(
                "STORAGE_ACCESS_KEY and STORAGE_SECRET_KEY must both be set"
            ));
        }

        if matches!(self.public_port, Some(0)) {
            return Err(anyhow::anyhow!("public storage port must be greater than 0"));
        }

        Ok(())
    }

    pub fn protocol(&self) -> &'static str {
        if self.use_ssl {
            "https"
        } else {
            "http"
        }
    }

    /// Address the storage client connects to.
    pub fn endpoint_url(&self) -> String {
        format!("{}://{}:{}", self.protocol(), self.endpoint, self.port)
    }

    /// Base used when rendering public object URLs.
    pub fn public_base_url(&self) -> String {
        let host = self.public_endpoint.as_deref().unwrap_or(&self.endpoint);
        let port = self.public_port.unwrap_or(self.port);
        format!("{}://{}:{}", self.protocol(), host, port)
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("endpoint", &self.endpoint)
            .field("port", &self.port)
            .field("use_ssl", &self.use_ssl)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .field("public_endpoint", &self.public_endpoint)
            .field("public_port", &self.public_port)
            .finish()
    }
}

/// Application configuration (gateway plus maintenance settings).
#[derive(Clone, Debug)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub retention_days: u32,
    pub max_upload_size_mb: u64,
    pub presigned_url_expiry_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_source(|key| env::var(key).ok())
    }

    pub fn from_source<F>(get: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gateway = GatewayConfig::from_source(&get)?;

        Ok(Config {
            gateway,
            retention_days: get("RETENTION_DAYS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(RETENTION_DAYS),
            max_upload_size_mb: get("MAX_UPLOAD_SIZE_MB")
                .and_then(|s| s.parse().ok())
                .filter(|&mb| mb > 0)
                .unwrap_or(MAX_UPLOAD_SIZE_MB),
            presigned_url_expiry_secs: get("PRESIGNED_URL_EXPIRY_SECS")
                .and_then(|s| s.parse().ok())
                .filter(|&secs| secs > 0)
                .unwrap_or(PRESIGNED_URL_EXPIRY_SECS),
        })
    }

    pub fn gateway(&self) -> &GatewayConfig {
        &self.gateway
    }

    pub fn retention_days(&self) -> u32 {
        self.retention_days
    }

    pub fn max_upload_size_mb(&self) -> u64 {
        self.max_upload_size_mb
    }

    pub fn presigned_url_expiry(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.presigned_url_expiry_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn source(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_gateway_config_from_source_defaults() {
        let config = GatewayConfig::from_source(source(&[
            ("STORAGE_ENDPOINT", "minio"),
            ("STORAGE_ACCESS_KEY", "access"),
            ("STORAGE_SECRET_KEY", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9000);
        assert!(!config.use_ssl);
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.endpoint_url(), "http://minio:9000");
        assert_eq!(config.public_base_url(), "http://minio:9000");
    }

    #[test]
    fn test_public_overrides_only_affect_url_rendering() {
        let config = GatewayConfig::from_source(source(&[
            ("STORAGE_ENDPOINT", "minio.internal"),
            ("STORAGE_PORT", "9000"),
            ("STORAGE_USE_SSL", "TRUE"),
            ("STORAGE_ACCESS_KEY", "access"),
            ("STORAGE_SECRET_KEY", "secret"),
            ("STORAGE_PUBLIC_ENDPOINT", "files.school.example"),
            ("STORAGE_PUBLIC_PORT", "443"),
        ]))
        .unwrap();

        assert_eq!(config.endpoint_url(), "https://minio.internal:9000");
        assert_eq!(config.public_base_url(), "https://files.school.example:443");
    }

    #[test]
    fn test_missing_endpoint_rejected() {
        let result = GatewayConfig::from_source(source(&[
            ("STORAGE_ACCESS_KEY", "access"),
            ("STORAGE_SECRET_KEY", "secret"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_port_rejected() {
        let result = GatewayConfig::from_source(source(&[
            ("STORAGE_ENDPOINT", "minio"),
            ("STORAGE_PORT", "not-a-port"),
            ("STORAGE_ACCESS_KEY", "access"),
            ("STORAGE_SECRET_KEY", "secret"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_scheme_and_missing_credentials() {
        let with_scheme = GatewayConfig::new("http://minio", 9000, false, "a", "b");
        assert!(with_scheme.validate().is_err());

        let no_secret = GatewayConfig::new("minio", 9000, false, "a", "");
        assert!(no_secret.validate().is_err());

        let zero_port = GatewayConfig::new("minio", 0, false, "a", "b");
        assert!(zero_port.validate().is_err());

        let ok = GatewayConfig::new("minio", 9000, false, "a", "b");
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = GatewayConfig::new("minio", 9000, false, "access", "super-secret");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_config_maintenance_defaults() {
        let config = Config::from_source(source(&[
            ("STORAGE_ENDPOINT", "minio"),
            ("STORAGE_ACCESS_KEY", "access"),
            ("STORAGE_SECRET_KEY", "secret"),
            ("MAX_UPLOAD_SIZE_MB", "0"),
        ]))
        .unwrap();

        assert_eq!(config.retention_days(), 90);
        assert_eq!(config.max_upload_size_mb(), 5);
        assert_eq!(config.presigned_url_expiry().as_secs(), 3600);
    }
}
