//! GoQuorum private transactions.
//!
//! The private payload is stored in the enclave first; the signed transaction
//! carries the enclave key in place of `data` and marks itself private with
//! `v = 37 | 38`.

use crate::{params::TransactionFields, types::EnclaveKey, TransactionError};
use alloy_primitives::{Bytes, U256};
use signer::Signature;

/// Base of the private `v` value.
pub const GOQUORUM_PRIVATE_V_BASE: u64 = 37;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoQuorumTransaction {
    pub fields: TransactionFields,
    pub private_from: Option<EnclaveKey>,
    pub private_for: Vec<EnclaveKey>,
    /// Key returned by the enclave for the stored payload.
    pub enclave_key: Option<Bytes>,
}

impl GoQuorumTransaction {
    pub fn set_enclave_key(&mut self, key: Bytes) {
        self.enclave_key = Some(key);
    }

    fn payload(&self) -> Result<&Bytes, TransactionError> {
        self.enclave_key
            .as_ref()
            .ok_or(TransactionError::MissingEnclaveKey)
    }

    /// `[nonce, gasPrice, gas, to, value, enclaveKey]`, no chain id.
    pub fn signing_payload(&self) -> Result<Vec<u8>, TransactionError> {
        Ok(self.fields.rlp_prefix_with_data(self.payload()?).finish())
    }

    pub fn encode(&self, signature: &Signature) -> Result<Vec<u8>, TransactionError> {
        let mut list = self.fields.rlp_prefix_with_data(self.payload()?);
        list.push(&U256::from(GOQUORUM_PRIVATE_V_BASE + signature.recovery_id()))
            .push(&signature.r)
            .push(&signature.s);
        Ok(list.finish())
    }
}
