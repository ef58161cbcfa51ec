use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Serialize, Serializer};
use std::{fmt, str::FromStr};

/// A 32 byte enclave public key or privacy group id, base64 encoded on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnclaveKey([u8; 32]);

impl EnclaveKey {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }
}

impl FromStr for EnclaveKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = STANDARD
            .decode(s)
            .map_err(|e| format!("not valid base64: {e}"))?;
        let bytes: [u8; 32] = decoded
            .try_into()
            .map_err(|v: Vec<u8>| format!("expected 32 bytes, got {}", v.len()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for EnclaveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

impl fmt::Display for EnclaveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

impl Serialize for EnclaveKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

/// Who may see the private payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restriction {
    Restricted,
    Unrestricted,
}

impl Restriction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Restricted => "restricted",
            Self::Unrestricted => "unrestricted",
        }
    }
}

impl FromStr for Restriction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "restricted" => Ok(Self::Restricted),
            "unrestricted" => Ok(Self::Unrestricted),
            other => Err(format!("unknown restriction {other:?}")),
        }
    }
}
