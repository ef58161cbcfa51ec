//! Signing capability abstraction.
//!
//! A [`SignerProvider`] maps an account address to a [`TransactionSigner`].
//! Custody backends plug in by implementing these two traits; the proxy never
//! sees key material.

mod local;
mod provider;

pub use local::LocalSigner;
pub use provider::MultiSignerProvider;

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use std::{collections::BTreeSet, sync::Arc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SignerError {
    /// Error with private key material
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Error reading a key file
    #[error("Failed to read key file {path}: {source}")]
    KeyFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The backend failed to produce a signature
    #[error("Signing failed: {0}")]
    Signing(String),
}

/// A recoverable secp256k1 signature.
///
/// `v` follows the `27 | 28` convention; callers derive the chain specific
/// value from [`Signature::recovery_id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub v: u64,
    pub r: U256,
    pub s: U256,
}

impl Signature {
    pub const fn new(v: u64, r: U256, s: U256) -> Self {
        Self { v, r, s }
    }

    /// Recovery id (0 or 1).
    pub const fn recovery_id(&self) -> u64 {
        if self.v >= 27 {
            self.v - 27
        } else {
            self.v
        }
    }

    /// Both `r` and `s` are strictly positive.
    pub fn is_well_formed(&self) -> bool {
        !self.r.is_zero() && !self.s.is_zero()
    }

    /// 65 byte `r || s || v` form used by `eth_sign`.
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..32].copy_from_slice(&self.r.to_be_bytes::<32>());
        out[32..64].copy_from_slice(&self.s.to_be_bytes::<32>());
        out[64] = (27 + self.recovery_id()) as u8;
        out
    }
}

/// A capability able to sign with the key owned by one address.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// The address whose key this signer holds.
    fn address(&self) -> Address;

    /// Sign `data`. Implementations hash with keccak-256 before signing.
    async fn sign(&self, data: &[u8]) -> Result<Signature, SignerError>;
}

/// Source of signers, keyed by account address.
pub trait SignerProvider: Send + Sync {
    /// Signer for `address`, if the backend holds its key.
    fn get_signer(&self, address: &Address) -> Option<Arc<dyn TransactionSigner>>;

    /// All addresses this backend can sign for, in ascending order.
    fn available_addresses(&self) -> BTreeSet<Address>;
}

/// EIP-191 personal message framing used by `eth_sign`.
pub fn personal_message(data: &[u8]) -> Vec<u8> {
    let prefix = format!("\x19Ethereum Signed Message:\n{}", data.len());
    let mut message = Vec::with_capacity(prefix.len() + data.len());
    message.extend_from_slice(prefix.as_bytes());
    message.extend_from_slice(data);
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovery_id() {
        assert_eq!(Signature::new(27, U256::from(1), U256::from(1)).recovery_id(), 0);
        assert_eq!(Signature::new(28, U256::from(1), U256::from(1)).recovery_id(), 1);
        assert_eq!(Signature::new(1, U256::from(1), U256::from(1)).recovery_id(), 1);
    }

    #[test]
    fn test_well_formed() {
        assert!(Signature::new(27, U256::from(1), U256::from(2)).is_well_formed());
        assert!(!Signature::new(27, U256::ZERO, U256::from(2)).is_well_formed());
        assert!(!Signature::new(27, U256::from(1), U256::ZERO).is_well_formed());
    }

    #[test]
    fn test_signature_bytes() {
        let bytes = Signature::new(28, U256::from(0xaa), U256::from(0xbb)).to_bytes();
        assert_eq!(bytes[31], 0xaa);
        assert_eq!(bytes[63], 0xbb);
        assert_eq!(bytes[64], 28);
    }

    #[test]
    fn test_personal_message() {
        assert_eq!(
            personal_message(b"hello"),
            b"\x19Ethereum Signed Message:\n5hello".to_vec()
        );
    }
}
