use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::{value::RawValue, Value};
use std::fmt;

use crate::JSONRPC_VERSION;

/// A JSON-RPC request id.
///
/// Kept as raw JSON text so that whatever the caller sent (`1`, `1.0`, `"abc"`,
/// `null`) is written back into the response unchanged.
#[derive(Clone, Serialize)]
#[serde(transparent)]
pub struct Id(Box<RawValue>);

impl Id {
    /// The `null` id, used when a request could not be decoded.
    pub fn null() -> Self {
        Self(RawValue::NULL.to_owned())
    }

    /// Build an id from a number.
    pub fn number(n: u64) -> Self {
        Self(RawValue::from_string(n.to_string()).unwrap_or_else(|_| RawValue::NULL.to_owned()))
    }

    /// Raw JSON text of the id.
    pub fn as_raw(&self) -> &str {
        self.0.get()
    }

    pub fn is_null(&self) -> bool {
        self.as_raw() == "null"
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_raw())
    }
}

impl PartialEq for Id {
    fn eq(&self, other: &Self) -> bool {
        self.as_raw() == other.as_raw()
    }
}

impl Eq for Id {}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        match raw.get().as_bytes().first() {
            Some(b'"' | b'-' | b'0'..=b'9') => Ok(Self(raw)),
            _ if raw.get() == "null" => Ok(Self(raw)),
            _ => Err(serde::de::Error::custom(
                "id must be null, a number or a string",
            )),
        }
    }
}

/// An inbound or outbound JSON-RPC request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default = "default_version")]
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub id: Id,
}

fn default_version() -> String {
    JSONRPC_VERSION.to_string()
}

impl JsonRpcRequest {
    pub fn new(method: impl Into<String>, params: Value, id: Id) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id,
        }
    }

    /// Decode a request from an HTTP body.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// Params as a positional list. A missing `params` is an empty list.
    pub fn params_as_array(&self) -> Option<&[Value]> {
        match &self.params {
            Value::Array(arr) => Some(arr),
            Value::Null => Some(&[]),
            _ => None,
        }
    }

    /// Deserialize the single positional parameter of requests shaped
    /// `params: [ { ... } ]`.
    pub fn single_param<T: DeserializeOwned>(&self) -> Result<T, ParamsError> {
        match self.params_as_array() {
            Some([param]) => {
                serde_json::from_value(param.clone()).map_err(|e| ParamsError::Invalid(e.to_string()))
            }
            Some(params) => Err(ParamsError::WrongCount {
                expected: 1,
                actual: params.len(),
            }),
            None => Err(ParamsError::NotAnArray),
        }
    }

    pub fn to_vec(&self) -> Vec<u8> {
        // A request built from owned strings and JSON values always serializes.
        serde_json::to_vec(self).unwrap_or_default()
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParamsError {
    #[error("params must be an array")]
    NotAnArray,

    #[error("expected {expected} parameter(s), got {actual}")]
    WrongCount { expected: usize, actual: usize },

    #[error("invalid parameter: {0}")]
    Invalid(String),
}
