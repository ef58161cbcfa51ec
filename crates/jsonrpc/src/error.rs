//! The closed set of JSON-RPC error conditions the proxy reports or recognizes.
//!
//! Codes are stable. Several conditions share the `-32000` server-error code,
//! so downstream errors are matched on `(code, message)`.

use serde::{Deserialize, Serialize};

/// Error conditions with their stable JSON-RPC code and message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JsonRpcErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    MethodNotEnabled,

    SigningFromIsNotAnUnlockedAccount,
    ConnectionToDownstreamNodeTimedOut,
    EthSendTxAlreadyKnown,
    EthSendTxReplacementUnderpriced,

    // Transaction validation failures reported by the node
    NonceTooLow,
    InvalidTransactionSignature,
    IntrinsicGasExceedsLimit,
    TransactionUpfrontCostExceedsBalance,
    ExceedsBlockGasLimit,
    IncorrectNonce,
    TxSenderNotAuthorized,
    GasPriceTooLow,

    // Private transactions
    EnclaveError,
}

impl JsonRpcErrorCode {
    pub const ALL: [Self; 19] = [
        Self::ParseError,
        Self::InvalidRequest,
        Self::MethodNotFound,
        Self::InvalidParams,
        Self::InternalError,
        Self::MethodNotEnabled,
        Self::SigningFromIsNotAnUnlockedAccount,
        Self::ConnectionToDownstreamNodeTimedOut,
        Self::EthSendTxAlreadyKnown,
        Self::EthSendTxReplacementUnderpriced,
        Self::NonceTooLow,
        Self::InvalidTransactionSignature,
        Self::IntrinsicGasExceedsLimit,
        Self::TransactionUpfrontCostExceedsBalance,
        Self::ExceedsBlockGasLimit,
        Self::IncorrectNonce,
        Self::TxSenderNotAuthorized,
        Self::GasPriceTooLow,
        Self::EnclaveError,
    ];

    pub const fn code(&self) -> i64 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
            Self::MethodNotEnabled => -32604,
            Self::SigningFromIsNotAnUnlockedAccount
            | Self::ConnectionToDownstreamNodeTimedOut
            | Self::EthSendTxAlreadyKnown
            | Self::EthSendTxReplacementUnderpriced => -32000,
            Self::NonceTooLow => -32001,
            Self::InvalidTransactionSignature => -32002,
            Self::IntrinsicGasExceedsLimit => -32003,
            Self::TransactionUpfrontCostExceedsBalance => -32004,
            Self::ExceedsBlockGasLimit => -32005,
            Self::IncorrectNonce => -32006,
            Self::TxSenderNotAuthorized => -32007,
            Self::GasPriceTooLow => -32009,
            Self::EnclaveError => -50100,
        }
    }

    pub const fn message(&self) -> &'static str {
        match self {
            Self::ParseError => "Parse error",
            Self::InvalidRequest => "Invalid Request",
            Self::MethodNotFound => "Method not found",
            Self::InvalidParams => "Invalid params",
            Self::InternalError => "Internal error",
            Self::MethodNotEnabled => "Method not enabled",
            Self::SigningFromIsNotAnUnlockedAccount => "From address is not an unlocked account",
            Self::ConnectionToDownstreamNodeTimedOut => "Connection to downstream node timed out",
            Self::EthSendTxAlreadyKnown => "Known transaction",
            Self::EthSendTxReplacementUnderpriced => "Replacement transaction underpriced",
            Self::NonceTooLow => "Nonce too low",
            Self::InvalidTransactionSignature => "Invalid signature",
            Self::IntrinsicGasExceedsLimit => "Intrinsic gas exceeds gas limit",
            Self::TransactionUpfrontCostExceedsBalance => "Upfront cost exceeds account balance",
            Self::ExceedsBlockGasLimit => "Transaction gas limit exceeds block gas limit",
            Self::IncorrectNonce => "Incorrect nonce",
            Self::TxSenderNotAuthorized => "Sender account not authorized to send transactions",
            Self::GasPriceTooLow => "Gas price below configured minimum gas price",
            Self::EnclaveError => "Error communicating with enclave",
        }
    }

    /// Recognize an error object returned by the downstream node.
    ///
    /// Geth reports a stale nonce as `-32000 "nonce too low: ..."`, so any
    /// message containing "nonce too low" is treated as [`Self::NonceTooLow`].
    pub fn from_downstream(code: i64, message: &str) -> Option<Self> {
        if message.to_ascii_lowercase().contains("nonce too low") {
            return Some(Self::NonceTooLow);
        }

        Self::ALL
            .into_iter()
            .find(|e| e.code() == code && e.message().eq_ignore_ascii_case(message.trim()))
    }
}
