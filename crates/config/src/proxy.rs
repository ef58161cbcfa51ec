//! Proxy configuration.
//!
//! Loaded from a TOML file, or assembled with [`ProxyConfigBuilder`]:
//!
//! ```toml
//! chain_id = 2018
//! data_path = "/var/lib/signer-proxy"
//!
//! [http]
//! host = "127.0.0.1"
//! port = 8545
//!
//! [downstream]
//! url = "http://127.0.0.1:8590"
//! request_timeout_ms = 5000
//!
//! [[signers]]
//! key_file = "/etc/signer-proxy/key"
//! ```

use serde::{Deserialize, Serialize};
use std::{
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 8545;
pub const DEFAULT_MOUNT_PATH: &str = "/";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Inbound HTTP listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    /// Port to bind; 0 picks a free port
    pub port: u16,
    /// Path JSON-RPC requests are posted to
    pub mount_path: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HTTP_HOST.to_string(),
            port: DEFAULT_HTTP_PORT,
            mount_path: DEFAULT_MOUNT_PATH.to_string(),
        }
    }
}

/// The node requests are forwarded to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownstreamConfig {
    /// Base URL; its path is prefixed to forwarded paths
    pub url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl DownstreamConfig {
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

const fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

/// Private transaction enclave, required for GoQuorum private sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnclaveConfig {
    pub url: String,
}

/// Where a signing key comes from.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignerConfig {
    /// File holding a hex private key
    KeyFile(PathBuf),
    /// Hex private key given inline
    PrivateKey(String),
}

impl fmt::Debug for SignerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyFile(path) => f.debug_tuple("KeyFile").field(path).finish(),
            Self::PrivateKey(_) => f.write_str("PrivateKey(<redacted>)"),
        }
    }
}

/// Top-level proxy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Chain id used for EIP-155 signatures
    pub chain_id: u64,

    /// Directory the ports file is written to
    #[serde(default)]
    pub data_path: Option<PathBuf>,

    #[serde(default)]
    pub http: HttpConfig,

    pub downstream: DownstreamConfig,

    #[serde(default)]
    pub enclave: Option<EnclaveConfig>,

    #[serde(default)]
    pub signers: Vec<SignerConfig>,

    /// Port of the Prometheus exporter, disabled when unset
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

impl ProxyConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        contents.parse()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chain_id == 0 {
            return Err(ConfigError::Invalid("chain_id must be positive".into()));
        }

        if !self.http.mount_path.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "http.mount_path must start with '/': {}",
                self.http.mount_path
            )));
        }

        if self.downstream.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "downstream.request_timeout_ms must be positive".into(),
            ));
        }

        validate_url("downstream.url", &self.downstream.url)?;
        if let Some(enclave) = &self.enclave {
            validate_url("enclave.url", &enclave.url)?;
        }

        Ok(())
    }
}

impl std::str::FromStr for ProxyConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

fn validate_url(field: &str, url: &str) -> Result<(), ConfigError> {
    let host = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"));

    match host {
        Some(rest) if !rest.is_empty() && !rest.starts_with('/') => Ok(()),
        _ => Err(ConfigError::Invalid(format!(
            "{field} must be an http(s) URL: {url}"
        ))),
    }
}

/// Builder for configurations assembled in code.
#[derive(Debug, Clone)]
pub struct ProxyConfigBuilder {
    config: ProxyConfig,
}

impl ProxyConfigBuilder {
    /// Start from defaults for `chain_id` forwarding to `downstream_url`.
    pub fn new(chain_id: u64, downstream_url: impl Into<String>) -> Self {
        Self {
            config: ProxyConfig {
                chain_id,
                data_path: None,
                http: HttpConfig::default(),
                downstream: DownstreamConfig {
                    url: downstream_url.into(),
                    request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
                },
                enclave: None,
                signers: Vec::new(),
                metrics_port: None,
            },
        }
    }

    pub fn http_host(mut self, host: impl Into<String>) -> Self {
        self.config.http.host = host.into();
        self
    }

    pub const fn http_port(mut self, port: u16) -> Self {
        self.config.http.port = port;
        self
    }

    pub fn mount_path(mut self, path: impl Into<String>) -> Self {
        self.config.http.mount_path = path.into();
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.downstream.request_timeout_ms =
            u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_path = Some(path.into());
        self
    }

    pub fn enclave_url(mut self, url: impl Into<String>) -> Self {
        self.config.enclave = Some(EnclaveConfig { url: url.into() });
        self
    }

    pub fn signer(mut self, signer: SignerConfig) -> Self {
        self.config.signers.push(signer);
        self
    }

    pub const fn metrics_port(mut self, port: u16) -> Self {
        self.config.metrics_port = Some(port);
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<ProxyConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
