use crate::{Transaction, TransactionError};
use alloy_primitives::hex;
use signer::TransactionSigner;
use tracing::{debug, error};

/// Signs transactions for one chain and produces the `0x`-hex raw form.
#[derive(Debug, Clone, Copy)]
pub struct TransactionSerializer {
    chain_id: u64,
}

impl TransactionSerializer {
    pub const fn new(chain_id: u64) -> Self {
        Self { chain_id }
    }

    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Sign `transaction` with `signer` and return the lowercase `0x` hex of
    /// its RLP encoding.
    pub async fn serialize(
        &self,
        signer: &dyn TransactionSigner,
        transaction: &Transaction,
    ) -> Result<String, TransactionError> {
        let payload = transaction.signing_payload(self.chain_id)?;
        let signature = signer.sign(&payload).await?;

        if !signature.is_well_formed() {
            error!(
                signer = %signer.address(),
                "Signer returned a signature with zero r or s"
            );
            return Err(TransactionError::MalformedSignature);
        }

        let encoded = transaction.encode(&signature, self.chain_id)?;
        debug!(
            sender = %transaction.sender(),
            nonce = ?transaction.nonce(),
            len = encoded.len(),
            "Transaction signed"
        );

        Ok(hex::encode_prefixed(encoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ETH_SEND_TRANSACTION;
    use alloy_primitives::{keccak256, Address, U256};
    use async_trait::async_trait;
    use jsonrpc::{Id, JsonRpcRequest};
    use serde_json::json;
    use signer::{LocalSigner, Signature, SignerError};

    const KEY: &str = "0x8f2a55949038a9610f50fb23b5883af3b4ecb3c3bb792cbcefbd1542c692be63";

    fn transaction() -> Transaction {
        let request = JsonRpcRequest::new(
            ETH_SEND_TRANSACTION,
            json!([{
                "from": "0xfe3b557e8fb62b89f4916b721be55ceb828dbd73",
                "to": "0x1b00ba00ca00bb00aa00bc00be00ac00ca00da00",
                "gas": "0x5208",
                "gasPrice": "0x3e8",
                "value": "0x18493fba64ef0000",
                "nonce": "0x2"
            }]),
            Id::number(1),
        );
        Transaction::from_request(&request).unwrap()
    }

    struct ZeroSigner;

    #[async_trait]
    impl TransactionSigner for ZeroSigner {
        fn address(&self) -> Address {
            Address::ZERO
        }

        async fn sign(&self, _data: &[u8]) -> Result<Signature, SignerError> {
            Ok(Signature::new(27, U256::ZERO, U256::from(1)))
        }
    }

    #[tokio::test]
    async fn test_serialized_transaction_recovers_sender() {
        let signer = LocalSigner::from_hex(KEY).unwrap();
        let tx = transaction();
        let serializer = TransactionSerializer::new(2018);

        let raw = serializer.serialize(&signer, &tx).await.unwrap();
        assert!(raw.starts_with("0x"));
        assert_eq!(raw, raw.to_lowercase());

        // Recover the sender from the encoded v, r, s and the EIP-155 preimage.
        let encoded = hex::decode(&raw).unwrap();
        let mut buf = encoded.as_slice();
        let header = alloy_rlp::Header::decode(&mut buf).unwrap();
        assert!(header.list);
        let mut fields = Vec::new();
        while !buf.is_empty() {
            fields.push(<U256 as alloy_rlp::Decodable>::decode(&mut buf).unwrap());
        }
        let (v, r, s) = (fields[6], fields[7], fields[8]);
        let recovery_id = v - U256::from(2018 * 2 + 35);
        assert!(recovery_id <= U256::from(1));

        let prehash = keccak256(tx.signing_payload(2018).unwrap());
        let recovered = alloy_primitives::Signature::new(r, s, recovery_id == U256::from(1))
            .recover_address_from_prehash(&prehash)
            .unwrap();
        assert_eq!(recovered, signer.address());
    }

    #[tokio::test]
    async fn test_zero_r_is_rejected() {
        let result = TransactionSerializer::new(1)
            .serialize(&ZeroSigner, &transaction())
            .await;
        assert!(matches!(result, Err(TransactionError::MalformedSignature)));
    }
}
