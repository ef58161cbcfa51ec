use crate::{Signature, SignerError, TransactionSigner};
use alloy_primitives::{keccak256, Address};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use std::{fmt, path::Path};
use tracing::debug;

/// Signs with a secp256k1 key held in process memory.
#[derive(Clone)]
pub struct LocalSigner {
    inner: PrivateKeySigner,
}

impl LocalSigner {
    /// Parse a hex private key, with or without `0x` prefix.
    pub fn from_hex(private_key: &str) -> Result<Self, SignerError> {
        let inner: PrivateKeySigner = private_key
            .trim()
            .parse()
            .map_err(|e| SignerError::InvalidPrivateKey(format!("{}", e)))?;

        Ok(Self { inner })
    }

    /// Load a hex private key from a file.
    pub fn from_key_file(path: impl AsRef<Path>) -> Result<Self, SignerError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| SignerError::KeyFile {
            path: path.display().to_string(),
            source,
        })?;

        let signer = Self::from_hex(&contents)?;
        debug!(address = %signer.address(), path = %path.display(), "Loaded key file");
        Ok(signer)
    }
}

impl fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.inner.address())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TransactionSigner for LocalSigner {
    fn address(&self) -> Address {
        self.inner.address()
    }

    async fn sign(&self, data: &[u8]) -> Result<Signature, SignerError> {
        let hash = keccak256(data);
        let signature = self
            .inner
            .sign_hash_sync(&hash)
            .map_err(|e| SignerError::Signing(e.to_string()))?;

        Ok(Signature::new(
            27 + u64::from(signature.v()),
            signature.r(),
            signature.s(),
        ))
    }
}
