use super::{JsonRpcHandler, ProxyResponse, RequestContext};
use crate::ProxyError;
use alloy_primitives::hex;
use async_trait::async_trait;
use serde_json::Value;
use signer::SignerProvider;
use std::sync::Arc;

/// Answers `eth_accounts` with the addresses the proxy can sign for.
pub struct EthAccountsHandler {
    signers: Arc<dyn SignerProvider>,
}

impl EthAccountsHandler {
    pub fn new(signers: Arc<dyn SignerProvider>) -> Self {
        Self { signers }
    }
}

#[async_trait]
impl JsonRpcHandler for EthAccountsHandler {
    async fn handle(&self, context: RequestContext) -> Result<ProxyResponse, ProxyError> {
        if !context
            .request
            .params_as_array()
            .is_some_and(|params| params.is_empty())
        {
            return Err(ProxyError::InvalidParams("eth_accounts takes no params".into()));
        }

        // Byte order of addresses is the order of their lowercase hex.
        let accounts = self
            .signers
            .available_addresses()
            .into_iter()
            .map(|address| Value::String(hex::encode_prefixed(address)))
            .collect();

        Ok(ProxyResponse::success(context.request.id, Value::Array(accounts)))
    }
}
