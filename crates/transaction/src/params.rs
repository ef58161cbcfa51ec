//! Validation of `eth_sendTransaction` / `eea_sendTransaction` parameter objects.

use crate::{
    types::{EnclaveKey, Restriction},
    TransactionError,
};
use alloy_primitives::{hex, Address, Bytes, U256};
use serde::Deserialize;

/// Gas limit used when the caller omits `gas`.
pub const DEFAULT_GAS: u64 = 90_000;

/// The raw parameter object as sent by the caller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTransactionParams {
    pub from: Option<String>,
    pub to: Option<String>,
    pub gas: Option<String>,
    pub gas_price: Option<String>,
    pub nonce: Option<String>,
    pub value: Option<String>,
    #[serde(alias = "input")]
    pub data: Option<String>,
    pub private_from: Option<String>,
    pub private_for: Option<Vec<String>>,
    pub privacy_group_id: Option<String>,
    pub restriction: Option<String>,
}

/// Fields shared by every transaction variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionFields {
    pub sender: Address,
    pub nonce: Option<U256>,
    pub gas_price: U256,
    pub gas_limit: U256,
    pub receiver: Option<Address>,
    pub value: U256,
    pub data: Bytes,
}

impl TransactionFields {
    pub fn from_params(params: &SendTransactionParams) -> Result<Self, TransactionError> {
        let sender = params
            .from
            .as_deref()
            .ok_or_else(|| invalid("from", "missing"))
            .and_then(|s| parse_address("from", s))?;

        let receiver = params
            .to
            .as_deref()
            .map(|s| parse_address("to", s))
            .transpose()?;

        let nonce = params
            .nonce
            .as_deref()
            .map(|s| parse_quantity("nonce", s))
            .transpose()?;

        let gas_limit = params
            .gas
            .as_deref()
            .map_or(Ok(U256::from(DEFAULT_GAS)), |s| parse_quantity("gas", s))?;

        let gas_price = params
            .gas_price
            .as_deref()
            .map_or(Ok(U256::ZERO), |s| parse_quantity("gasPrice", s))?;

        let value = params
            .value
            .as_deref()
            .map_or(Ok(U256::ZERO), |s| parse_quantity("value", s))?;

        let data = params
            .data
            .as_deref()
            .map_or(Ok(Bytes::new()), |s| parse_data("data", s))?;

        Ok(Self {
            sender,
            nonce,
            gas_price,
            gas_limit,
            receiver,
            value,
            data,
        })
    }
}

fn invalid(field: &str, reason: impl std::fmt::Display) -> TransactionError {
    TransactionError::InvalidParams(format!("{field}: {reason}"))
}

/// `0x`-prefixed hex quantity of at most 256 bits.
pub fn parse_quantity(field: &str, s: &str) -> Result<U256, TransactionError> {
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| invalid(field, "must be 0x-prefixed hex"))?;

    if digits.is_empty() || digits.len() > 64 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid(field, format!("invalid hex quantity {s:?}")));
    }

    U256::from_str_radix(digits, 16).map_err(|e| invalid(field, e))
}

/// `0x` followed by exactly 40 hex digits.
pub fn parse_address(field: &str, s: &str) -> Result<Address, TransactionError> {
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| invalid(field, "address must be 0x-prefixed"))?;

    if digits.len() != 40 {
        return Err(invalid(field, format!("address must be 20 bytes, got {s:?}")));
    }

    digits.parse().map_err(|e| invalid(field, e))
}

/// `0x`-prefixed hex byte string.
pub fn parse_data(field: &str, s: &str) -> Result<Bytes, TransactionError> {
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| invalid(field, "must be 0x-prefixed hex"))?;

    hex::decode(digits)
        .map(Bytes::from)
        .map_err(|e| invalid(field, e))
}

pub fn parse_enclave_key(field: &str, s: &str) -> Result<EnclaveKey, TransactionError> {
    s.parse().map_err(|e: String| invalid(field, e))
}

pub fn parse_enclave_keys(field: &str, keys: &[String]) -> Result<Vec<EnclaveKey>, TransactionError> {
    keys.iter().map(|k| parse_enclave_key(field, k)).collect()
}

pub fn parse_restriction(s: Option<&str>) -> Result<Restriction, TransactionError> {
    s.ok_or_else(|| invalid("restriction", "missing"))?
        .parse()
        .map_err(|e: String| invalid("restriction", e))
}
