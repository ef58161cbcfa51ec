//! Transaction-signing JSON-RPC proxy.
//!
//! Sits in front of a node, signs `eth_sendTransaction` style requests with
//! locally held keys and submits them as raw transactions. Every other request
//! is passed through unchanged.

pub mod error;
pub mod handler;
pub mod mapper;
pub mod metrics;
pub mod ports;
pub mod retry;
pub mod server;
pub mod signers;

pub use error::ProxyError;
pub use mapper::RequestMapper;
pub use server::ProxyServer;
