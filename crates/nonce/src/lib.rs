//! Nonce lookup for transactions submitted without one.
//!
//! Public transactions count against the sender's public account; private
//! transactions count against the privacy group they are sent to.

pub mod provider;

pub use provider::DownstreamNonceProvider;

use alloy_primitives::{Address, U256};
use client::ClientError;
use std::future::Future;
use thiserror::Error;
use transaction::{EnclaveKey, Transaction};

pub const ETH_GET_TRANSACTION_COUNT: &str = "eth_getTransactionCount";
pub const EEA_GET_TRANSACTION_COUNT: &str = "eea_getTransactionCount";
pub const PRIV_GET_TRANSACTION_COUNT: &str = "priv_getTransactionCount";

#[derive(Error, Debug)]
pub enum NonceError {
    /// The node did not answer within the request timeout
    #[error("Nonce request timed out")]
    Timeout,

    /// The node could not be reached or rejected the call
    #[error("Nonce request failed: {0}")]
    Downstream(String),

    /// The node answered with something other than a quantity
    #[error("Invalid nonce in response: {0}")]
    InvalidResponse(String),
}

impl From<ClientError> for NonceError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Timeout => Self::Timeout,
            ClientError::InvalidResponse(msg) => Self::InvalidResponse(msg),
            other => Self::Downstream(other.to_string()),
        }
    }
}

/// Which counter to read for a sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NonceQuery {
    /// Public account nonce, also used for GoQuorum private transactions
    Public {
        sender: Address,
    },
    /// Nonce within the privacy group formed by `private_from` and `private_for`
    Eea {
        sender: Address,
        private_from: EnclaveKey,
        private_for: Vec<EnclaveKey>,
    },
    /// Nonce within a named privacy group
    PrivacyGroup {
        sender: Address,
        privacy_group_id: EnclaveKey,
    },
}

impl NonceQuery {
    pub fn for_transaction(transaction: &Transaction) -> Self {
        match transaction {
            Transaction::Eth(tx) => Self::Public {
                sender: tx.fields.sender,
            },
            Transaction::GoQuorum(tx) => Self::Public {
                sender: tx.fields.sender,
            },
            Transaction::Eea(tx) => Self::Eea {
                sender: tx.fields.sender,
                private_from: tx.private_from,
                private_for: tx.private_for.clone(),
            },
            Transaction::PrivacyGroup(tx) => Self::PrivacyGroup {
                sender: tx.fields.sender,
                privacy_group_id: tx.privacy_group_id,
            },
        }
    }

    pub const fn sender(&self) -> Address {
        match self {
            Self::Public { sender }
            | Self::Eea { sender, .. }
            | Self::PrivacyGroup { sender, .. } => *sender,
        }
    }

    /// JSON-RPC method answering this query.
    pub const fn method(&self) -> &'static str {
        match self {
            Self::Public { .. } => ETH_GET_TRANSACTION_COUNT,
            Self::Eea { .. } => EEA_GET_TRANSACTION_COUNT,
            Self::PrivacyGroup { .. } => PRIV_GET_TRANSACTION_COUNT,
        }
    }
}

/// Source of the next nonce for a sender.
pub trait NonceProvider: Send + Sync {
    fn get_nonce(
        &self,
        query: &NonceQuery,
    ) -> impl Future<Output = Result<U256, NonceError>> + Send;
}
