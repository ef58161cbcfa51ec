use super::{JsonRpcHandler, ProxyResponse, RequestContext};
use crate::ProxyError;
use alloy_primitives::hex;
use async_trait::async_trait;
use serde_json::Value;
use signer::{personal_message, SignerProvider};
use std::sync::Arc;
use tracing::{debug, error};
use transaction::{params, TransactionError};

/// Answers `eth_sign` with an EIP-191 personal message signature.
///
/// Params are `[address, data]`; the reply is the 65 byte `r || s || v` hex.
pub struct EthSignHandler {
    signers: Arc<dyn SignerProvider>,
}

impl EthSignHandler {
    pub fn new(signers: Arc<dyn SignerProvider>) -> Self {
        Self { signers }
    }
}

#[async_trait]
impl JsonRpcHandler for EthSignHandler {
    async fn handle(&self, context: RequestContext) -> Result<ProxyResponse, ProxyError> {
        let request = context.request;

        let [address, data] = request.params_as_array().unwrap_or_default() else {
            return Err(ProxyError::InvalidParams(
                "eth_sign expects [address, data]".into(),
            ));
        };

        let address = as_str("address", address)
            .and_then(|s| params::parse_address("address", s))?;
        let data = as_str("data", data).and_then(|s| params::parse_data("data", s))?;

        let signer = self
            .signers
            .get_signer(&address)
            .ok_or(ProxyError::UnknownSigner(address))?;

        let signature = signer
            .sign(&personal_message(&data))
            .await
            .map_err(TransactionError::from)?;
        if !signature.is_well_formed() {
            error!(signer = %address, "Signer returned a signature with zero r or s");
            return Err(TransactionError::MalformedSignature.into());
        }

        debug!(%address, len = data.len(), "Signed message");
        Ok(ProxyResponse::success(
            request.id,
            Value::String(hex::encode_prefixed(signature.to_bytes())),
        ))
    }
}

fn as_str<'a>(field: &str, value: &'a Value) -> Result<&'a str, TransactionError> {
    value
        .as_str()
        .ok_or_else(|| TransactionError::InvalidParams(format!("{field}: expected a string")))
}
