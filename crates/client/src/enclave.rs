//! Client for the private transaction enclave.
//!
//! GoQuorum private transactions never carry their payload on chain. The
//! payload is stored with `/storeraw` first and the returned key takes its
//! place in the signed transaction.

use crate::{create_http_client, parse_url, ClientError};
use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct EnclaveClient {
    client: reqwest::Client,
    url: Url,
}

impl EnclaveClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            client: create_http_client(timeout)?,
            url: parse_url(url)?,
        })
    }

    /// Creates an enclave client with a custom HTTP client.
    pub fn with_client(client: reqwest::Client, url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            client,
            url: parse_url(url)?,
        })
    }

    /// Store `payload` in the enclave on behalf of `from` (a base64 enclave
    /// public key) and return the key it was stored under.
    pub async fn store_raw(&self, payload: &[u8], from: Option<&str>) -> Result<Bytes, ClientError> {
        let url = parse_url(&format!(
            "{}/storeraw",
            self.url.as_str().trim_end_matches('/')
        ))?;

        let request = StoreRawRequest {
            payload: STANDARD.encode(payload),
            from,
        };

        let response = self.client.post(url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            return Err(ClientError::Enclave(format!(
                "storeraw returned {status}: {body}"
            )));
        }

        let reply: StoreRawResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Enclave(format!("invalid storeraw reply: {e}")))?;

        let key = STANDARD
            .decode(reply.key.as_bytes())
            .map_err(|e| ClientError::Enclave(format!("storeraw key is not base64: {e}")))?;

        debug!(len = payload.len(), "Stored private payload in enclave");
        Ok(Bytes::from(key))
    }
}

#[derive(Debug, Serialize)]
struct StoreRawRequest<'a> {
    payload: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct StoreRawResponse {
    key: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    const FROM: &str = "A1aVtMxLCUHmBVHXoZzzBgPbW/wj5axDpW9X8l91SGo=";

    #[tokio::test]
    async fn test_store_raw_returns_decoded_key() {
        let server = MockServer::start();
        let key = [7u8; 64];
        let mock = server.mock(|when, then| {
            when.method(POST).path("/storeraw").json_body(json!({
                "payload": STANDARD.encode(b"\x60\x80"),
                "from": FROM,
            }));
            then.status(200)
                .json_body(json!({"key": STANDARD.encode(key)}));
        });

        let client = EnclaveClient::new(&server.base_url(), Duration::from_secs(1)).unwrap();
        let stored = client.store_raw(b"\x60\x80", Some(FROM)).await.unwrap();

        mock.assert();
        assert_eq!(stored.as_ref(), key.as_slice());
    }

    #[tokio::test]
    async fn test_store_raw_without_from() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/storeraw")
                .json_body(json!({"payload": ""}));
            then.status(200).json_body(json!({"key": "AQID"}));
        });

        let client = EnclaveClient::new(&server.base_url(), Duration::from_secs(1)).unwrap();
        let stored = client.store_raw(b"", None).await.unwrap();

        mock.assert();
        assert_eq!(stored.as_ref(), &[1, 2, 3]);
    }

    #[tokio::test]
    async fn test_store_raw_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/storeraw");
            then.status(500).body("enclave down");
        });

        let client = EnclaveClient::new(&server.base_url(), Duration::from_secs(1)).unwrap();
        let err = client.store_raw(b"data", None).await.unwrap_err();
        assert!(matches!(err, ClientError::Enclave(msg) if msg.contains("enclave down")));
    }
}
