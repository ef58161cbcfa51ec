use super::{HttpExchange, JsonRpcHandler, ProxyResponse, RequestContext};
use crate::{
    metrics::Metrics,
    retry::{RetryState, MAX_SEND_ATTEMPTS},
    ProxyError,
};
use alloy_primitives::Bytes as TxBytes;
use async_trait::async_trait;
use bytes::Bytes;
use client::{DownstreamClient, DownstreamResponse, EnclaveClient};
use jsonrpc::{Id, JsonRpcErrorCode};
use nonce::{NonceProvider, NonceQuery};
use signer::{SignerProvider, TransactionSigner};
use std::sync::Arc;
use tracing::{debug, error, warn};
use transaction::{GoQuorumTransaction, Transaction, TransactionSerializer};

/// Signs `eth_sendTransaction` and `eea_sendTransaction` requests and submits
/// them downstream as raw transactions.
///
/// The pipeline runs on its own task: once started, a send completes even if
/// the caller goes away.
pub struct SendTransactionHandler<N> {
    pipeline: Arc<SendPipeline<N>>,
}

impl<N> Clone for SendTransactionHandler<N> {
    fn clone(&self) -> Self {
        Self {
            pipeline: self.pipeline.clone(),
        }
    }
}

struct SendPipeline<N> {
    serializer: TransactionSerializer,
    signers: Arc<dyn SignerProvider>,
    nonces: N,
    downstream: DownstreamClient,
    enclave: Option<EnclaveClient>,
    max_attempts: usize,
    metrics: Metrics,
}

impl<N> SendTransactionHandler<N>
where
    N: NonceProvider + 'static,
{
    pub fn new(
        chain_id: u64,
        signers: Arc<dyn SignerProvider>,
        nonces: N,
        downstream: DownstreamClient,
        enclave: Option<EnclaveClient>,
        metrics: Metrics,
    ) -> Self {
        Self {
            pipeline: Arc::new(SendPipeline {
                serializer: TransactionSerializer::new(chain_id),
                signers,
                nonces,
                downstream,
                enclave,
                max_attempts: MAX_SEND_ATTEMPTS,
                metrics,
            }),
        }
    }
}

#[async_trait]
impl<N> JsonRpcHandler for SendTransactionHandler<N>
where
    N: NonceProvider + 'static,
{
    async fn handle(&self, context: RequestContext) -> Result<ProxyResponse, ProxyError> {
        let pipeline = self.pipeline.clone();

        tokio::spawn(async move { pipeline.run(context).await })
            .await
            .map_err(|e| ProxyError::Task(e.to_string()))?
    }
}

impl<N> SendPipeline<N>
where
    N: NonceProvider,
{
    async fn run(&self, context: RequestContext) -> Result<ProxyResponse, ProxyError> {
        let RequestContext { http, request } = context;

        let mut transaction = Transaction::from_request(&request)?;
        let sender = transaction.sender();
        let signer = self
            .signers
            .get_signer(&sender)
            .ok_or(ProxyError::UnknownSigner(sender))?;

        if let Transaction::GoQuorum(private) = &mut transaction {
            self.store_private_payload(private).await?;
        }

        let auto_nonce = transaction.nonce().is_none();
        let mut retry = RetryState::new(self.max_attempts);

        loop {
            if auto_nonce {
                let nonce = self
                    .nonces
                    .get_nonce(&NonceQuery::for_transaction(&transaction))
                    .await
                    .inspect_err(|e| error!(%sender, error = %e, "Failed to resolve nonce"))?;
                transaction.update_nonce(nonce);
            }

            retry.record_attempt();
            let response = self
                .submit(signer.as_ref(), &transaction, &http, request.id.clone())
                .await?;

            let nonce_too_low = response
                .json_rpc()
                .and_then(|reply| reply.error_kind())
                == Some(JsonRpcErrorCode::NonceTooLow);

            if !(auto_nonce && nonce_too_low) {
                debug!(
                    %sender,
                    nonce = ?transaction.nonce(),
                    attempt = retry.attempts(),
                    status = %response.status,
                    "Transaction submitted"
                );
                return Ok(ProxyResponse::from_downstream(response));
            }

            if !retry.can_retry() {
                error!(
                    %sender,
                    attempts = retry.attempts(),
                    "Nonce still too low, giving up"
                );
                return Err(ProxyError::RetriesExhausted(retry.attempts()));
            }

            warn!(
                %sender,
                nonce = ?transaction.nonce(),
                attempt = retry.attempts(),
                "Nonce too low, resubmitting with a fresh nonce"
            );
            self.metrics.record_nonce_retry();
        }
    }

    /// Sign `transaction` and send its raw form downstream over the same HTTP
    /// method, path and headers as the inbound request.
    async fn submit(
        &self,
        signer: &dyn TransactionSigner,
        transaction: &Transaction,
        http: &HttpExchange,
        id: Id,
    ) -> Result<DownstreamResponse, ProxyError> {
        let raw = self.serializer.serialize(signer, transaction).await?;
        self.metrics.record_transaction_signed(transaction.raw_method());

        let body = Bytes::from(transaction.raw_transaction_request(raw, id).to_vec());
        debug!(method = transaction.raw_method(), "Sending raw transaction");

        self.downstream
            .forward(http.method.clone(), &http.path_and_query, &http.headers, body)
            .await
            .map_err(ProxyError::Downstream)
    }

    /// Store the private payload in the enclave and swap in the returned key.
    async fn store_private_payload(
        &self,
        transaction: &mut GoQuorumTransaction,
    ) -> Result<(), ProxyError> {
        let enclave = self
            .enclave
            .as_ref()
            .ok_or(ProxyError::EnclaveNotConfigured)?;

        let from = transaction.private_from.map(|key| key.to_base64());
        let key = enclave
            .store_raw(&transaction.fields.data, from.as_deref())
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to store private payload");
                ProxyError::Enclave(e)
            })?;

        transaction.set_enclave_key(TxBytes::from(key));
        Ok(())
    }
}
