//! JSON-RPC 2.0 envelopes and the error taxonomy shared by the signing proxy.
//!
//! This crate provides:
//! - [`JsonRpcRequest`] with an [`Id`] that round-trips byte for byte
//! - Success and error response bodies
//! - [`JsonRpcErrorCode`], the closed set of error conditions the proxy reports

pub mod error;
pub mod request;
pub mod response;

pub use error::JsonRpcErrorCode;
pub use request::{Id, JsonRpcRequest};
pub use response::{ErrorObject, JsonRpcErrorResponse, JsonRpcResponse, JsonRpcSuccessResponse};

/// The protocol version every envelope carries.
pub const JSONRPC_VERSION: &str = "2.0";
