//! JSON-RPC method handlers.
//!
//! Every decoded request is handed to exactly one [`JsonRpcHandler`], picked
//! by method name from the [`RequestMapper`](crate::mapper::RequestMapper).

mod accounts;
mod eth_sign;
mod passthrough;
mod send_transaction;
mod sign_transaction;

pub use accounts::EthAccountsHandler;
pub use eth_sign::EthSignHandler;
pub use passthrough::PassThroughHandler;
pub use send_transaction::SendTransactionHandler;
pub use sign_transaction::SignTransactionHandler;

use crate::ProxyError;
use async_trait::async_trait;
use axum::{
    http::{header::CONTENT_TYPE, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use client::{relayed_headers, DownstreamResponse};
use jsonrpc::{Id, JsonRpcErrorCode, JsonRpcErrorResponse, JsonRpcRequest, JsonRpcSuccessResponse};
use serde_json::Value;

pub const ETH_SIGN: &str = "eth_sign";
pub const ETH_ACCOUNTS: &str = "eth_accounts";

/// An inbound HTTP request, kept verbatim for forwarding.
#[derive(Debug, Clone)]
pub struct HttpExchange {
    pub method: Method,
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// A decoded JSON-RPC request together with the HTTP request it arrived in.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub http: HttpExchange,
    pub request: JsonRpcRequest,
}

/// The reply sent back to the caller.
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ProxyResponse {
    pub fn success(id: Id, result: Value) -> Self {
        Self::json(StatusCode::OK, &JsonRpcSuccessResponse::new(id, result))
    }

    pub fn error(status: StatusCode, id: Id, code: JsonRpcErrorCode) -> Self {
        Self::json(status, &JsonRpcErrorResponse::new(id, code))
    }

    fn json(status: StatusCode, body: &impl serde::Serialize) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        // Envelopes hold only strings, raw JSON and values; they always serialize.
        let body = serde_json::to_vec(body).unwrap_or_default();

        Self {
            status,
            headers,
            body: Bytes::from(body),
        }
    }

    /// Relay a downstream reply unchanged apart from framing headers.
    pub fn from_downstream(response: DownstreamResponse) -> Self {
        Self {
            status: response.status,
            headers: relayed_headers(&response.headers),
            body: response.body,
        }
    }
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        (self.status, self.headers, self.body).into_response()
    }
}

/// Handles the JSON-RPC requests for one or more methods.
#[async_trait]
pub trait JsonRpcHandler: Send + Sync {
    async fn handle(&self, context: RequestContext) -> Result<ProxyResponse, ProxyError>;
}
