use crate::{create_http_client, parse_url, ClientError};
use bytes::Bytes;
use jsonrpc::{JsonRpcRequest, JsonRpcResponse};
use reqwest::{
    header::{HeaderMap, HeaderName, CONTENT_LENGTH, HOST, ORIGIN, TRANSFER_ENCODING},
    Method, StatusCode, Url,
};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");

/// A reply from the downstream node, kept exactly as received.
#[derive(Debug, Clone)]
pub struct DownstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl DownstreamResponse {
    /// The body decoded as a JSON-RPC reply, if it is one.
    pub fn json_rpc(&self) -> Option<JsonRpcResponse> {
        JsonRpcResponse::from_slice(&self.body)
    }
}

/// Client for the node the proxy sits in front of.
///
/// The configured URL's path acts as a prefix for forwarded request paths.
#[derive(Debug, Clone)]
pub struct DownstreamClient {
    client: reqwest::Client,
    base_url: Url,
}

impl DownstreamClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            client: create_http_client(timeout)?,
            base_url: parse_url(url)?,
        })
    }

    /// Creates a downstream client with a custom HTTP client.
    pub fn with_client(client: reqwest::Client, url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            client,
            base_url: parse_url(url)?,
        })
    }

    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Downstream URL for an inbound `path_and_query`.
    pub fn url_for(&self, path_and_query: &str) -> Result<Url, ClientError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = if path_and_query.starts_with('/') {
            path_and_query.to_string()
        } else {
            format!("/{path_and_query}")
        };
        parse_url(&format!("{base}{path}"))
    }

    /// Send a request downstream and buffer the reply.
    ///
    /// `headers` are the inbound headers; they are rewritten by
    /// [`forwarded_headers`].
    pub async fn forward(
        &self,
        method: Method,
        path_and_query: &str,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Result<DownstreamResponse, ClientError> {
        let url = self.url_for(path_and_query)?;
        debug!(%method, %url, len = body.len(), "Forwarding request downstream");

        let response = self
            .client
            .request(method, url)
            .headers(forwarded_headers(headers))
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        debug!(%status, len = body.len(), "Downstream replied");

        Ok(DownstreamResponse {
            status,
            headers,
            body,
        })
    }

    /// Perform a JSON-RPC call against the base URL and return its `result`.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        let request = JsonRpcRequest::new(method, params, jsonrpc::Id::number(1));

        let response = self
            .client
            .post(self.base_url.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        let Some(reply) = JsonRpcResponse::from_slice(&body) else {
            return Err(ClientError::InvalidResponse(format!(
                "{method} returned {status} with a non JSON-RPC body"
            )));
        };

        if let Some(error) = reply.error {
            return Err(ClientError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        reply
            .result
            .ok_or_else(|| ClientError::InvalidResponse(format!("{method} returned no result")))
    }
}

/// Inbound headers as sent downstream: framing headers are dropped (the client
/// recomputes them), `Origin` is stripped and `Host` becomes `X-Forwarded-Host`.
pub fn forwarded_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(inbound.len());

    for (name, value) in inbound {
        if name == CONTENT_LENGTH || name == TRANSFER_ENCODING || name == ORIGIN {
            continue;
        }

        if name == HOST {
            headers.append(X_FORWARDED_HOST, value.clone());
        } else {
            headers.append(name.clone(), value.clone());
        }
    }

    headers
}

/// Downstream headers as relayed to the caller, minus framing headers.
pub fn relayed_headers(downstream: &HeaderMap) -> HeaderMap {
    let mut headers = downstream.clone();
    headers.remove(CONTENT_LENGTH);
    headers.remove(TRANSFER_ENCODING);
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use reqwest::header::{HeaderValue, CONTENT_TYPE};
    use serde_json::json;

    #[test]
    fn test_url_for_joins_prefix_and_path() {
        let client = DownstreamClient::new("http://127.0.0.1:8590", Duration::from_secs(1)).unwrap();
        assert_eq!(client.url_for("/").unwrap().as_str(), "http://127.0.0.1:8590/");
        assert_eq!(
            client.url_for("/login?user=a").unwrap().as_str(),
            "http://127.0.0.1:8590/login?user=a"
        );

        let client =
            DownstreamClient::new("http://127.0.0.1:8590/node/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.url_for("/rpc").unwrap().as_str(),
            "http://127.0.0.1:8590/node/rpc"
        );
    }

    #[test]
    fn test_forwarded_headers() {
        let mut inbound = HeaderMap::new();
        inbound.insert(HOST, HeaderValue::from_static("proxy.local:8545"));
        inbound.insert(ORIGIN, HeaderValue::from_static("http://dapp.local"));
        inbound.insert(CONTENT_LENGTH, HeaderValue::from_static("42"));
        inbound.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        inbound.insert("x-custom", HeaderValue::from_static("kept"));

        let headers = forwarded_headers(&inbound);

        assert!(headers.get(HOST).is_none());
        assert!(headers.get(ORIGIN).is_none());
        assert!(headers.get(CONTENT_LENGTH).is_none());
        assert_eq!(headers["x-forwarded-host"], "proxy.local:8545");
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(headers["x-custom"], "kept");
    }

    #[tokio::test]
    async fn test_call_returns_result() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/")
                .json_body_partial(r#"{"method": "eth_getTransactionCount"}"#);
            then.status(200)
                .json_body(json!({"jsonrpc": "2.0", "id": 1, "result": "0x7"}));
        });

        let client = DownstreamClient::new(&server.url("/"), Duration::from_secs(1)).unwrap();
        let result = client
            .call("eth_getTransactionCount", json!(["0x01", "pending"]))
            .await
            .unwrap();

        assert_eq!(result, json!("0x7"));
        mock.assert();
    }

    #[tokio::test]
    async fn test_call_surfaces_rpc_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/");
            then.status(200).json_body(
                json!({"jsonrpc": "2.0", "id": 1, "error": {"code": -32601, "message": "Method not found"}}),
            );
        });

        let client = DownstreamClient::new(&server.url("/"), Duration::from_secs(1)).unwrap();
        let err = client.call("eea_getTransactionCount", json!([])).await.unwrap_err();
        assert!(matches!(err, ClientError::Rpc { code: -32601, .. }));
    }

    #[tokio::test]
    async fn test_timeout_is_classified() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/");
            then.status(200)
                .delay(Duration::from_millis(500))
                .body("{}");
        });

        let client = DownstreamClient::new(&server.url("/"), Duration::from_millis(50)).unwrap();
        let err = client.call("eth_blockNumber", json!([])).await.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Nothing listens on port 1.
        let client = DownstreamClient::new("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();
        let err = client
            .forward(Method::POST, "/", &HeaderMap::new(), Bytes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Connection(_)));
    }

    #[tokio::test]
    async fn test_forward_keeps_body_verbatim() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PUT).path("/login").body("raw body");
            then.status(418)
                .header("x-downstream", "yes")
                .body("{not json");
        });

        let client = DownstreamClient::new(&server.url("/"), Duration::from_secs(1)).unwrap();
        let response = client
            .forward(
                Method::PUT,
                "/login",
                &HeaderMap::new(),
                Bytes::from_static(b"raw body"),
            )
            .await
            .unwrap();

        mock.assert();
        assert_eq!(response.status, StatusCode::IM_A_TEAPOT);
        assert_eq!(response.headers["x-downstream"], "yes");
        assert_eq!(response.body, Bytes::from_static(b"{not json"));
        assert!(response.json_rpc().is_none());
    }
}
