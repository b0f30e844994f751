use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    9403
}

/// Storage backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Base URL of the storage modules (e.g. "http://localhost:9130").
    /// Callers may override it per request via the X-Okapi-Url header.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Timeout for item/instance storage requests in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Timeout for a single reference lookup in seconds. A lookup that
    /// exceeds this counts as an error outcome and its section is omitted.
    #[serde(default = "default_lookup_timeout")]
    pub lookup_timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            lookup_timeout_secs: default_lookup_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:9130".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_lookup_timeout() -> u64 {
    10
}

/// Ingest pipeline configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngestConfig {
    /// Material type name applied to ingested records when the batch does
    /// not name one.
    #[serde(default = "default_material_type")]
    pub default_material_type: String,
    /// Loan type name applied to ingested records when the batch does not
    /// name one.
    #[serde(default = "default_loan_type")]
    pub default_loan_type: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            default_material_type: default_material_type(),
            default_loan_type: default_loan_type(),
        }
    }
}

fn default_material_type() -> String {
    "Book".to_string()
}

fn default_loan_type() -> String {
    "Can Circulate".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 9403);
        assert_eq!(config.storage.base_url, "http://localhost:9130");
        assert_eq!(config.ingest.default_material_type, "Book");
        assert_eq!(config.ingest.default_loan_type, "Can Circulate");
    }
}
