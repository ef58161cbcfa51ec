use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{JsonRpcErrorCode, Id, JSONRPC_VERSION};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ErrorObject {
    /// The known condition this error object represents, if any.
    pub fn kind(&self) -> Option<JsonRpcErrorCode> {
        JsonRpcErrorCode::from_downstream(self.code, &self.message)
    }
}

impl From<JsonRpcErrorCode> for ErrorObject {
    fn from(code: JsonRpcErrorCode) -> Self {
        Self {
            code: code.code(),
            message: code.message().to_string(),
            data: None,
        }
    }
}

/// Successful reply produced locally by the proxy.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcSuccessResponse {
    pub jsonrpc: &'static str,
    pub id: Id,
    pub result: Value,
}

impl JsonRpcSuccessResponse {
    pub const fn new(id: Id, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result,
        }
    }
}

/// Error reply produced locally by the proxy.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcErrorResponse {
    pub jsonrpc: &'static str,
    pub id: Id,
    pub error: ErrorObject,
}

impl JsonRpcErrorResponse {
    pub fn new(id: Id, code: JsonRpcErrorCode) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            error: code.into(),
        }
    }
}

/// A reply received from the downstream node.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<ErrorObject>,
}

impl JsonRpcResponse {
    /// Decode a downstream body. Non-JSON bodies yield `None`.
    pub fn from_slice(body: &[u8]) -> Option<Self> {
        serde_json::from_slice(body).ok()
    }

    pub fn error_kind(&self) -> Option<JsonRpcErrorCode> {
        self.error.as_ref().and_then(ErrorObject::kind)
    }
}
