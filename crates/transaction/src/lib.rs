//! Transaction model for the signing proxy.
//!
//! This crate provides:
//! - [`Transaction`], a closed set of variants built from JSON-RPC params
//! - The RLP signing preimage and signed encoding of each variant
//! - [`TransactionSerializer`], which signs and hex encodes a transaction

pub mod eea;
pub mod eth;
pub mod params;
pub mod quorum;
mod rlp;
pub mod serializer;
pub mod types;

pub use eea::{EeaTransaction, PrivacyGroupTransaction};
pub use eth::EthTransaction;
pub use params::{SendTransactionParams, TransactionFields};
pub use quorum::GoQuorumTransaction;
pub use serializer::TransactionSerializer;
pub use types::{EnclaveKey, Restriction};

use alloy_primitives::{Address, U256};
use jsonrpc::{Id, JsonRpcRequest};
use serde_json::{json, Value};
use signer::{Signature, SignerError};
use thiserror::Error;

pub const ETH_SEND_TRANSACTION: &str = "eth_sendTransaction";
pub const ETH_SIGN_TRANSACTION: &str = "eth_signTransaction";
pub const EEA_SEND_TRANSACTION: &str = "eea_sendTransaction";
pub const ETH_SEND_RAW_TRANSACTION: &str = "eth_sendRawTransaction";
pub const EEA_SEND_RAW_TRANSACTION: &str = "eea_sendRawTransaction";
pub const ETH_SEND_RAW_PRIVATE_TRANSACTION: &str = "eth_sendRawPrivateTransaction";

#[derive(Error, Debug)]
pub enum TransactionError {
    /// Malformed or inconsistent params
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// The JSON-RPC method does not describe a transaction
    #[error("Method does not carry a transaction: {0}")]
    UnsupportedMethod(String),

    /// A GoQuorum payload was signed before being stored in the enclave
    #[error("Private payload has not been stored in the enclave")]
    MissingEnclaveKey,

    /// The signer returned a zero r or s
    #[error("Signer produced a malformed signature")]
    MalformedSignature,

    #[error(transparent)]
    Signer(#[from] SignerError),
}

/// An unsigned transaction request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    Eth(EthTransaction),
    Eea(EeaTransaction),
    PrivacyGroup(PrivacyGroupTransaction),
    GoQuorum(GoQuorumTransaction),
}

impl Transaction {
    /// Build the transaction described by an inbound request.
    pub fn from_request(request: &JsonRpcRequest) -> Result<Self, TransactionError> {
        let params: SendTransactionParams = request
            .single_param()
            .map_err(|e| TransactionError::InvalidParams(e.to_string()))?;

        match request.method.as_str() {
            ETH_SEND_TRANSACTION => Self::eth(&params, true),
            ETH_SIGN_TRANSACTION => Self::eth(&params, false),
            EEA_SEND_TRANSACTION => Self::eea(&params),
            other => Err(TransactionError::UnsupportedMethod(other.to_string())),
        }
    }

    fn eth(params: &SendTransactionParams, allow_private: bool) -> Result<Self, TransactionError> {
        let fields = TransactionFields::from_params(params)?;

        if params.privacy_group_id.is_some() {
            return Err(TransactionError::InvalidParams(
                "privacyGroupId is only supported by eea_sendTransaction".into(),
            ));
        }

        let Some(private_for) = &params.private_for else {
            return Ok(Self::Eth(EthTransaction::new(fields)));
        };

        if !allow_private {
            return Err(TransactionError::InvalidParams(
                "private transactions cannot be signed without being sent".into(),
            ));
        }

        let private_from = params
            .private_from
            .as_deref()
            .map(|s| params::parse_enclave_key("privateFrom", s))
            .transpose()?;

        Ok(Self::GoQuorum(GoQuorumTransaction {
            fields,
            private_from,
            private_for: params::parse_enclave_keys("privateFor", private_for)?,
            enclave_key: None,
        }))
    }

    fn eea(params: &SendTransactionParams) -> Result<Self, TransactionError> {
        let fields = TransactionFields::from_params(params)?;

        let private_from = params
            .private_from
            .as_deref()
            .ok_or_else(|| TransactionError::InvalidParams("privateFrom: missing".into()))
            .and_then(|s| params::parse_enclave_key("privateFrom", s))?;
        let restriction = params::parse_restriction(params.restriction.as_deref())?;

        match (&params.private_for, &params.privacy_group_id) {
            (Some(private_for), None) => Ok(Self::Eea(EeaTransaction {
                fields,
                private_from,
                private_for: params::parse_enclave_keys("privateFor", private_for)?,
                restriction,
            })),
            (None, Some(group)) => Ok(Self::PrivacyGroup(PrivacyGroupTransaction {
                fields,
                private_from,
                privacy_group_id: params::parse_enclave_key("privacyGroupId", group)?,
                restriction,
            })),
            (Some(_), Some(_)) => Err(TransactionError::InvalidParams(
                "privateFor and privacyGroupId are mutually exclusive".into(),
            )),
            (None, None) => Err(TransactionError::InvalidParams(
                "one of privateFor or privacyGroupId is required".into(),
            )),
        }
    }

    pub const fn fields(&self) -> &TransactionFields {
        match self {
            Self::Eth(tx) => &tx.fields,
            Self::Eea(tx) => &tx.fields,
            Self::PrivacyGroup(tx) => &tx.fields,
            Self::GoQuorum(tx) => &tx.fields,
        }
    }

    fn fields_mut(&mut self) -> &mut TransactionFields {
        match self {
            Self::Eth(tx) => &mut tx.fields,
            Self::Eea(tx) => &mut tx.fields,
            Self::PrivacyGroup(tx) => &mut tx.fields,
            Self::GoQuorum(tx) => &mut tx.fields,
        }
    }

    pub const fn sender(&self) -> Address {
        self.fields().sender
    }

    pub const fn nonce(&self) -> Option<U256> {
        self.fields().nonce
    }

    /// Replace the nonce once it has been resolved.
    pub fn update_nonce(&mut self, nonce: U256) {
        self.fields_mut().nonce = Some(nonce);
    }

    /// Method used to submit the signed form downstream.
    pub const fn raw_method(&self) -> &'static str {
        match self {
            Self::Eth(_) => ETH_SEND_RAW_TRANSACTION,
            Self::Eea(_) | Self::PrivacyGroup(_) => EEA_SEND_RAW_TRANSACTION,
            Self::GoQuorum(_) => ETH_SEND_RAW_PRIVATE_TRANSACTION,
        }
    }

    /// The bytes handed to the signer.
    pub fn signing_payload(&self, chain_id: u64) -> Result<Vec<u8>, TransactionError> {
        match self {
            Self::Eth(tx) => Ok(tx.signing_payload(chain_id)),
            Self::Eea(tx) => Ok(tx.signing_payload(chain_id)),
            Self::PrivacyGroup(tx) => Ok(tx.signing_payload(chain_id)),
            Self::GoQuorum(tx) => tx.signing_payload(),
        }
    }

    /// RLP encoding of the signed transaction.
    pub fn encode(&self, signature: &Signature, chain_id: u64) -> Result<Vec<u8>, TransactionError> {
        match self {
            Self::Eth(tx) => Ok(tx.encode(signature, chain_id)),
            Self::Eea(tx) => Ok(tx.encode(signature, chain_id)),
            Self::PrivacyGroup(tx) => Ok(tx.encode(signature, chain_id)),
            Self::GoQuorum(tx) => tx.encode(signature),
        }
    }

    /// Params of the raw-transaction request carrying `raw`.
    pub fn raw_params(&self, raw: String) -> Value {
        match self {
            Self::GoQuorum(tx) => json!([raw, { "privateFor": tx.private_for }]),
            _ => json!([raw]),
        }
    }

    /// The downstream request submitting the signed transaction, reusing the
    /// caller's id.
    pub fn raw_transaction_request(&self, raw: String, id: Id) -> JsonRpcRequest {
        JsonRpcRequest::new(self.raw_method(), self.raw_params(raw), id)
    }
}

/// EIP-155 `v`: `recoveryId + chainId * 2 + 35`.
pub fn eip155_v(signature: &Signature, chain_id: u64) -> U256 {
    U256::from(signature.recovery_id()) + U256::from(chain_id) * U256::from(2) + U256::from(35)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, Bytes};
    use alloy_rlp::{Decodable, Header};

    const PRIVATE_FROM: &str = "A1aVtMxLCUHmBVHXoZzzBgPbW/wj5axDpW9X8l91SGo=";
    const PRIVATE_FOR: &str = "Ko2bVqD+nNlNYL5EE7y3IdOnviftjiizpjRt+HTuFBs=";
    const GROUP: &str = "DyAOiF/ynpc+JXa2YAGB0bCitSlOMNm+ShmB/7M6C4w=";

    fn request(method: &str, params: Value) -> JsonRpcRequest {
        JsonRpcRequest::new(method, json!([params]), Id::number(1))
    }

    fn transfer() -> Value {
        json!({
            "from": "0xfe3b557e8fb62b89f4916b721be55ceb828dbd73",
            "to": "0x1b00ba00ca00bb00aa00bc00be00ac00ca00da00",
            "gas": "0x5208",
            "gasPrice": "0x3e8",
            "value": "0x18493fba64ef0000"
        })
    }

    fn eea(extra: Value) -> Value {
        let mut params = json!({
            "from": "0xfe3b557e8fb62b89f4916b721be55ceb828dbd73",
            "to": "0x1b00ba00ca00bb00aa00bc00be00ac00ca00da00",
            "privateFrom": PRIVATE_FROM,
            "restriction": "restricted",
            "data": "0x01"
        });
        for (k, v) in extra.as_object().unwrap() {
            params[k] = v.clone();
        }
        params
    }

    fn signature() -> Signature {
        Signature::new(28, U256::from(0x1234), U256::from(0x5678))
    }

    /// Split an RLP list into the encodings of its items.
    fn list_items(mut buf: &[u8]) -> Vec<Vec<u8>> {
        let header = Header::decode(&mut buf).unwrap();
        assert!(header.list);
        assert_eq!(header.payload_length, buf.len());

        let mut items = Vec::new();
        while !buf.is_empty() {
            let start = buf;
            let item = Header::decode(&mut buf).unwrap();
            buf = &buf[item.payload_length..];
            items.push(start[..start.len() - buf.len()].to_vec());
        }
        items
    }

    fn decode<T: Decodable>(item: &[u8]) -> T {
        T::decode(&mut &item[..]).unwrap()
    }

    #[test]
    fn test_plain_transaction_from_params() {
        let tx = Transaction::from_request(&request(ETH_SEND_TRANSACTION, transfer())).unwrap();
        let Transaction::Eth(eth) = &tx else {
            panic!("expected plain transaction, got {tx:?}");
        };

        assert_eq!(tx.sender(), address!("fe3b557e8fb62b89f4916b721be55ceb828dbd73"));
        assert_eq!(eth.fields.value, U256::from(1_750_000_000_000_000_000u64));
        assert_eq!(eth.fields.gas_price, U256::from(1000));
        assert_eq!(eth.fields.gas_limit, U256::from(21000));
        assert_eq!(tx.nonce(), None);
        assert_eq!(tx.raw_method(), ETH_SEND_RAW_TRANSACTION);
    }

    #[test]
    fn test_update_nonce() {
        let mut tx = Transaction::from_request(&request(ETH_SEND_TRANSACTION, transfer())).unwrap();
        tx.update_nonce(U256::from(7));
        assert_eq!(tx.nonce(), Some(U256::from(7)));
    }

    #[test]
    fn test_malformed_params() {
        let mut params = transfer();
        params["value"] = json!("1000");
        assert!(matches!(
            Transaction::from_request(&request(ETH_SEND_TRANSACTION, params)),
            Err(TransactionError::InvalidParams(_))
        ));

        let mut params = transfer();
        params["to"] = json!("0x1234");
        assert!(matches!(
            Transaction::from_request(&request(ETH_SEND_TRANSACTION, params)),
            Err(TransactionError::InvalidParams(_))
        ));

        let no_params = JsonRpcRequest::new(ETH_SEND_TRANSACTION, json!([]), Id::number(1));
        assert!(matches!(
            Transaction::from_request(&no_params),
            Err(TransactionError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_privacy_fields_are_mutually_exclusive() {
        let both = eea(json!({"privateFor": [PRIVATE_FOR], "privacyGroupId": GROUP}));
        assert!(matches!(
            Transaction::from_request(&request(EEA_SEND_TRANSACTION, both)),
            Err(TransactionError::InvalidParams(_))
        ));

        let neither = eea(json!({}));
        assert!(matches!(
            Transaction::from_request(&request(EEA_SEND_TRANSACTION, neither)),
            Err(TransactionError::InvalidParams(_))
        ));

        let private_for = eea(json!({"privateFor": [PRIVATE_FOR]}));
        assert!(matches!(
            Transaction::from_request(&request(EEA_SEND_TRANSACTION, private_for)),
            Ok(Transaction::Eea(_))
        ));

        let group = eea(json!({"privacyGroupId": GROUP}));
        assert!(matches!(
            Transaction::from_request(&request(EEA_SEND_TRANSACTION, group)),
            Ok(Transaction::PrivacyGroup(_))
        ));
    }

    #[test]
    fn test_eea_requires_private_from_and_restriction() {
        let mut params = eea(json!({"privateFor": [PRIVATE_FOR]}));
        params.as_object_mut().unwrap().remove("privateFrom");
        assert!(Transaction::from_request(&request(EEA_SEND_TRANSACTION, params)).is_err());

        let mut params = eea(json!({"privateFor": [PRIVATE_FOR]}));
        params["restriction"] = json!("sometimes");
        assert!(Transaction::from_request(&request(EEA_SEND_TRANSACTION, params)).is_err());
    }

    #[test]
    fn test_eth_send_with_private_for_is_goquorum() {
        let mut params = transfer();
        params["privateFor"] = json!([PRIVATE_FOR]);
        let tx = Transaction::from_request(&request(ETH_SEND_TRANSACTION, params.clone())).unwrap();
        assert!(matches!(tx, Transaction::GoQuorum(_)));
        assert_eq!(tx.raw_method(), ETH_SEND_RAW_PRIVATE_TRANSACTION);
        assert_eq!(
            tx.raw_params("0xab".into()),
            json!(["0xab", {"privateFor": [PRIVATE_FOR]}])
        );

        // Signing without sending is only defined for public transactions.
        assert!(Transaction::from_request(&request(ETH_SIGN_TRANSACTION, params)).is_err());

        let mut params = transfer();
        params["privacyGroupId"] = json!(GROUP);
        assert!(Transaction::from_request(&request(ETH_SEND_TRANSACTION, params)).is_err());
    }

    #[test]
    fn test_unsupported_method() {
        assert!(matches!(
            Transaction::from_request(&request("eth_call", transfer())),
            Err(TransactionError::UnsupportedMethod(_))
        ));
    }

    #[test]
    fn test_eip155_preimage_matches_published_example() {
        // Example from EIP-155.
        let fields = TransactionFields {
            sender: Address::ZERO,
            nonce: Some(U256::from(9)),
            gas_price: U256::from(20_000_000_000u64),
            gas_limit: U256::from(21000),
            receiver: Some(address!("3535353535353535353535353535353535353535")),
            value: U256::from(1_000_000_000_000_000_000u64),
            data: Bytes::new(),
        };
        let tx = EthTransaction::new(fields);

        assert_eq!(
            alloy_primitives::hex::encode(tx.signing_payload(1)),
            "ec098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a764000080018080"
        );
    }

    #[test]
    fn test_plain_encoding_round_trips() {
        let mut tx = Transaction::from_request(&request(ETH_SEND_TRANSACTION, transfer())).unwrap();
        tx.update_nonce(U256::from(5));

        let chain_id = 2018;
        let encoded = tx.encode(&signature(), chain_id).unwrap();
        let items = list_items(&encoded);
        assert_eq!(items.len(), 9);

        assert_eq!(decode::<U256>(&items[0]), U256::from(5));
        assert_eq!(decode::<U256>(&items[1]), U256::from(1000));
        assert_eq!(decode::<U256>(&items[2]), U256::from(21000));
        assert_eq!(
            decode::<Address>(&items[3]),
            address!("1b00ba00ca00bb00aa00bc00be00ac00ca00da00")
        );
        assert_eq!(decode::<U256>(&items[4]), U256::from(1_750_000_000_000_000_000u64));
        assert_eq!(decode::<Bytes>(&items[5]), Bytes::new());
        assert_eq!(decode::<U256>(&items[6]), U256::from(1 + 2018 * 2 + 35));
        assert_eq!(decode::<U256>(&items[7]), U256::from(0x1234));
        assert_eq!(decode::<U256>(&items[8]), U256::from(0x5678));
    }

    #[test]
    fn test_contract_creation_encodes_empty_receiver() {
        let mut params = transfer();
        params.as_object_mut().unwrap().remove("to");
        params["data"] = json!("0x6080");
        let mut tx = Transaction::from_request(&request(ETH_SEND_TRANSACTION, params)).unwrap();
        tx.update_nonce(U256::ZERO);

        let items = list_items(&tx.encode(&signature(), 1).unwrap());
        assert_eq!(items[0], vec![0x80]);
        assert_eq!(items[3], vec![0x80]);
        assert_eq!(decode::<Bytes>(&items[5]), Bytes::from(vec![0x60, 0x80]));
    }

    #[test]
    fn test_eea_encoding_appends_privacy_fields() {
        let mut tx = Transaction::from_request(&request(
            EEA_SEND_TRANSACTION,
            eea(json!({"privateFor": [PRIVATE_FOR]})),
        ))
        .unwrap();
        tx.update_nonce(U256::from(1));

        let items = list_items(&tx.encode(&signature(), 2018).unwrap());
        assert_eq!(items.len(), 12);

        let private_from: EnclaveKey = PRIVATE_FROM.parse().unwrap();
        let private_for: EnclaveKey = PRIVATE_FOR.parse().unwrap();
        assert_eq!(decode::<Bytes>(&items[9]).as_ref(), private_from.as_bytes());
        assert_eq!(
            decode::<Vec<Bytes>>(&items[10]),
            vec![Bytes::copy_from_slice(private_for.as_bytes())]
        );
        assert_eq!(decode::<Bytes>(&items[11]).as_ref(), b"restricted");

        // Preimage carries chainId, 0, 0 in place of v, r, s.
        let preimage = list_items(&tx.signing_payload(2018).unwrap());
        assert_eq!(preimage.len(), 12);
        assert_eq!(decode::<U256>(&preimage[6]), U256::from(2018));
        assert_eq!(preimage[7], vec![0x80]);
        assert_eq!(preimage[8], vec![0x80]);
        assert_eq!(preimage[10], items[10]);
    }

    #[test]
    fn test_privacy_group_encoding() {
        let mut tx = Transaction::from_request(&request(
            EEA_SEND_TRANSACTION,
            eea(json!({"privacyGroupId": GROUP})),
        ))
        .unwrap();
        tx.update_nonce(U256::from(1));

        let items = list_items(&tx.encode(&signature(), 2018).unwrap());
        let group: EnclaveKey = GROUP.parse().unwrap();
        assert_eq!(decode::<Bytes>(&items[10]).as_ref(), group.as_bytes());
        assert_eq!(tx.raw_method(), EEA_SEND_RAW_TRANSACTION);
    }

    #[test]
    fn test_goquorum_encoding_uses_enclave_key() {
        let mut params = transfer();
        params["privateFor"] = json!([PRIVATE_FOR]);
        params["data"] = json!("0xdeadbeef");
        let mut tx = Transaction::from_request(&request(ETH_SEND_TRANSACTION, params)).unwrap();
        tx.update_nonce(U256::from(3));

        assert!(matches!(
            tx.signing_payload(1),
            Err(TransactionError::MissingEnclaveKey)
        ));

        let key = Bytes::from(vec![7u8; 64]);
        if let Transaction::GoQuorum(quorum) = &mut tx {
            quorum.set_enclave_key(key.clone());
        }

        let preimage = list_items(&tx.signing_payload(1).unwrap());
        assert_eq!(preimage.len(), 6);
        assert_eq!(decode::<Bytes>(&preimage[5]), key);

        let items = list_items(&tx.encode(&signature(), 1).unwrap());
        assert_eq!(items.len(), 9);
        assert_eq!(decode::<Bytes>(&items[5]), key);
        assert_eq!(decode::<U256>(&items[6]), U256::from(38));
    }
}
