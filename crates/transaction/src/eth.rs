use crate::{eip155_v, params::TransactionFields, rlp::RlpList};
use signer::Signature;

/// A public value transfer, contract call or contract creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EthTransaction {
    pub fields: TransactionFields,
}

impl EthTransaction {
    pub const fn new(fields: TransactionFields) -> Self {
        Self { fields }
    }

    /// EIP-155 preimage: `[nonce, gasPrice, gas, to, value, data, chainId, 0, 0]`.
    pub fn signing_payload(&self, chain_id: u64) -> Vec<u8> {
        let mut list = self.fields.rlp_prefix();
        list.push(&chain_id).push(&0u8).push(&0u8);
        list.finish()
    }

    pub fn encode(&self, signature: &Signature, chain_id: u64) -> Vec<u8> {
        let mut list = self.fields.rlp_prefix();
        list.push(&eip155_v(signature, chain_id))
            .push(&signature.r)
            .push(&signature.s);
        list.finish()
    }
}

impl TransactionFields {
    /// `[nonce, gasPrice, gas, to, value, data]` with the given payload.
    pub(crate) fn rlp_prefix_with_data(&self, data: &[u8]) -> RlpList {
        let mut list = RlpList::new();
        list.push(&self.nonce.unwrap_or_default())
            .push(&self.gas_price)
            .push(&self.gas_limit);
        match &self.receiver {
            Some(to) => list.push(to),
            None => list.push_bytes(&[]),
        };
        list.push(&self.value).push_bytes(data);
        list
    }

    pub(crate) fn rlp_prefix(&self) -> RlpList {
        self.rlp_prefix_with_data(&self.data)
    }
}
