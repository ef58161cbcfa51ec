use super::{JsonRpcHandler, ProxyResponse, RequestContext};
use crate::{metrics::Metrics, ProxyError};
use async_trait::async_trait;
use nonce::{NonceProvider, NonceQuery};
use serde_json::Value;
use signer::SignerProvider;
use std::sync::Arc;
use tracing::debug;
use transaction::{Transaction, TransactionSerializer};

/// Answers `eth_signTransaction` locally with the signed raw transaction.
pub struct SignTransactionHandler<N> {
    serializer: TransactionSerializer,
    signers: Arc<dyn SignerProvider>,
    nonces: N,
    metrics: Metrics,
}

impl<N> SignTransactionHandler<N>
where
    N: NonceProvider,
{
    pub fn new(chain_id: u64, signers: Arc<dyn SignerProvider>, nonces: N, metrics: Metrics) -> Self {
        Self {
            serializer: TransactionSerializer::new(chain_id),
            signers,
            nonces,
            metrics,
        }
    }
}

#[async_trait]
impl<N> JsonRpcHandler for SignTransactionHandler<N>
where
    N: NonceProvider,
{
    async fn handle(&self, context: RequestContext) -> Result<ProxyResponse, ProxyError> {
        let request = context.request;

        let mut transaction = Transaction::from_request(&request)?;
        let sender = transaction.sender();
        let signer = self
            .signers
            .get_signer(&sender)
            .ok_or(ProxyError::UnknownSigner(sender))?;

        if transaction.nonce().is_none() {
            let nonce = self
                .nonces
                .get_nonce(&NonceQuery::for_transaction(&transaction))
                .await?;
            transaction.update_nonce(nonce);
        }

        let raw = self
            .serializer
            .serialize(signer.as_ref(), &transaction)
            .await?;
        self.metrics.record_transaction_signed(request.method.as_str());
        debug!(%sender, nonce = ?transaction.nonce(), "Signed transaction");

        Ok(ProxyResponse::success(request.id, Value::String(raw)))
    }
}
