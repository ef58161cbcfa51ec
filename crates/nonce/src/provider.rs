use crate::{NonceError, NonceProvider, NonceQuery};
use alloy_primitives::{hex, U256};
use client::DownstreamClient;
use serde_json::{json, Value};
use tracing::debug;

/// Block tag the counters are read at, so queued transactions are counted.
const PENDING: &str = "pending";

/// Reads nonces from the downstream node.
#[derive(Debug, Clone)]
pub struct DownstreamNonceProvider {
    client: DownstreamClient,
}

impl DownstreamNonceProvider {
    pub const fn new(client: DownstreamClient) -> Self {
        Self { client }
    }

    fn params(query: &NonceQuery) -> Value {
        match query {
            NonceQuery::Public { sender } => json!([hex::encode_prefixed(sender), PENDING]),
            NonceQuery::Eea {
                sender,
                private_from,
                private_for,
            } => json!([hex::encode_prefixed(sender), private_from, private_for]),
            NonceQuery::PrivacyGroup {
                sender,
                privacy_group_id,
            } => json!([hex::encode_prefixed(sender), privacy_group_id]),
        }
    }
}

impl NonceProvider for DownstreamNonceProvider {
    async fn get_nonce(&self, query: &NonceQuery) -> Result<U256, NonceError> {
        debug!(
            sender = %query.sender(),
            method = query.method(),
            "Querying nonce"
        );

        let result = self
            .client
            .call(query.method(), Self::params(query))
            .await?;

        let nonce = parse_nonce(&result)?;
        debug!(sender = %query.sender(), %nonce, "Resolved nonce");
        Ok(nonce)
    }
}

/// Parse a `0x`-prefixed hex quantity.
fn parse_nonce(value: &Value) -> Result<U256, NonceError> {
    let invalid = || NonceError::InvalidResponse(value.to_string());

    let digits = value
        .as_str()
        .and_then(|s| s.strip_prefix("0x"))
        .filter(|digits| !digits.is_empty())
        .ok_or_else(invalid)?;

    U256::from_str_radix(digits, 16).map_err(|_| invalid())
}
