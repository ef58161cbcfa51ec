//! Configuration types for the signing proxy.
//!
//! This crate provides:
//! - The proxy configuration and its TOML file format
//! - A builder for programmatic construction
//! - Validation of loaded values

pub mod proxy;

pub use proxy::{
    ConfigError, DownstreamConfig, EnclaveConfig, HttpConfig, ProxyConfig, ProxyConfigBuilder,
    SignerConfig,
};
