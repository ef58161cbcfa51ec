//! EEA private transactions, addressed either by a `privateFor` list or by a
//! precomputed privacy group id.
//!
//! Both carry the privacy fields after the signature:
//! `[..., v, r, s, privateFrom, privateFor | privacyGroupId, restriction]`.

use crate::{
    eip155_v,
    params::TransactionFields,
    rlp::RlpList,
    types::{EnclaveKey, Restriction},
};
use signer::Signature;

/// Recipients of an EEA private payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrivacyRecipients {
    PrivateFor(Vec<EnclaveKey>),
    PrivacyGroup(EnclaveKey),
}

impl PrivacyRecipients {
    fn append(&self, list: &mut RlpList) {
        match self {
            Self::PrivateFor(keys) => {
                list.push_bytes_list(keys.iter().map(|k| k.as_bytes().as_slice()));
            }
            Self::PrivacyGroup(group) => {
                list.push_bytes(group.as_bytes());
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateFields {
    pub private_from: EnclaveKey,
    pub recipients: PrivacyRecipients,
    pub restriction: Restriction,
}

impl PrivateFields {
    fn append(&self, list: &mut RlpList) {
        list.push_bytes(self.private_from.as_bytes());
        self.recipients.append(list);
        list.push_bytes(self.restriction.as_str().as_bytes());
    }

    fn signing_payload(&self, fields: &TransactionFields, chain_id: u64) -> Vec<u8> {
        let mut list = fields.rlp_prefix();
        list.push(&chain_id).push(&0u8).push(&0u8);
        self.append(&mut list);
        list.finish()
    }

    fn encode(&self, fields: &TransactionFields, signature: &Signature, chain_id: u64) -> Vec<u8> {
        let mut list = fields.rlp_prefix();
        list.push(&eip155_v(signature, chain_id))
            .push(&signature.r)
            .push(&signature.s);
        self.append(&mut list);
        list.finish()
    }
}

/// EEA private transaction sent to an explicit `privateFor` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EeaTransaction {
    pub fields: TransactionFields,
    pub private_from: EnclaveKey,
    pub private_for: Vec<EnclaveKey>,
    pub restriction: Restriction,
}

impl EeaTransaction {
    fn private_fields(&self) -> PrivateFields {
        PrivateFields {
            private_from: self.private_from,
            recipients: PrivacyRecipients::PrivateFor(self.private_for.clone()),
            restriction: self.restriction,
        }
    }

    pub fn signing_payload(&self, chain_id: u64) -> Vec<u8> {
        self.private_fields().signing_payload(&self.fields, chain_id)
    }

    pub fn encode(&self, signature: &Signature, chain_id: u64) -> Vec<u8> {
        self.private_fields().encode(&self.fields, signature, chain_id)
    }
}

/// EEA private transaction sent to a privacy group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivacyGroupTransaction {
    pub fields: TransactionFields,
    pub private_from: EnclaveKey,
    pub privacy_group_id: EnclaveKey,
    pub restriction: Restriction,
}

impl PrivacyGroupTransaction {
    const fn private_fields(&self) -> PrivateFields {
        PrivateFields {
            private_from: self.private_from,
            recipients: PrivacyRecipients::PrivacyGroup(self.privacy_group_id),
            restriction: self.restriction,
        }
    }

    pub fn signing_payload(&self, chain_id: u64) -> Vec<u8> {
        self.private_fields().signing_payload(&self.fields, chain_id)
    }

    pub fn encode(&self, signature: &Signature, chain_id: u64) -> Vec<u8> {
        self.private_fields().encode(&self.fields, signature, chain_id)
    }
}
