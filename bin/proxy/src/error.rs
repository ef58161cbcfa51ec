use crate::handler::ProxyResponse;
use alloy_primitives::Address;
use axum::http::StatusCode;
use client::ClientError;
use jsonrpc::{Id, JsonRpcErrorCode};
use nonce::NonceError;
use thiserror::Error;
use transaction::TransactionError;

/// Failures of a proxied request, reported to the caller as a JSON-RPC error.
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("{0} is not an unlocked account")]
    UnknownSigner(Address),

    #[error(transparent)]
    Nonce(#[from] NonceError),

    #[error("Downstream request failed: {0}")]
    Downstream(#[from] ClientError),

    #[error("Enclave request failed: {0}")]
    Enclave(ClientError),

    #[error("Private transactions require an enclave")]
    EnclaveNotConfigured,

    #[error("Nonce still too low after {0} attempts")]
    RetriesExhausted(usize),

    #[error("Request task failed: {0}")]
    Task(String),
}

impl ProxyError {
    /// The error condition reported to the caller.
    pub const fn code(&self) -> JsonRpcErrorCode {
        match self {
            Self::Transaction(TransactionError::InvalidParams(_))
            | Self::Transaction(TransactionError::UnsupportedMethod(_))
            | Self::InvalidParams(_) => JsonRpcErrorCode::InvalidParams,
            Self::Transaction(_) => JsonRpcErrorCode::InternalError,
            Self::UnknownSigner(_) => JsonRpcErrorCode::SigningFromIsNotAnUnlockedAccount,
            Self::Nonce(NonceError::Timeout) | Self::Downstream(ClientError::Timeout) => {
                JsonRpcErrorCode::ConnectionToDownstreamNodeTimedOut
            }
            Self::Nonce(_) | Self::Downstream(_) => JsonRpcErrorCode::InternalError,
            Self::Enclave(_) => JsonRpcErrorCode::EnclaveError,
            Self::EnclaveNotConfigured => JsonRpcErrorCode::MethodNotEnabled,
            Self::RetriesExhausted(_) | Self::Task(_) => JsonRpcErrorCode::InternalError,
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self.code() {
            JsonRpcErrorCode::ConnectionToDownstreamNodeTimedOut => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Error reply for the request with `id`.
    pub fn into_response(self, id: Id) -> ProxyResponse {
        ProxyResponse::error(self.status(), id, self.code())
    }
}
