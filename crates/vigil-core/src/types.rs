use serde::{Deserialize, Serialize};
use std::fmt;

pub use alloy_primitives::{Address, U256};

use crate::error::CoreError;

/// A single public signal emitted by a circuit.
///
/// Signals are BN254 scalar field elements; they always fit in 256 bits.
pub type Signal = U256;

/// Parse a signal from its textual form.
///
/// Accepts decimal strings (the form proof toolchains emit) and `0x`-prefixed hex.
pub fn parse_signal(text: &str) -> Result<Signal, CoreError> {
    let text = text.trim();
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex_digits) => U256::from_str_radix(hex_digits, 16),
        None => U256::from_str_radix(text, 10),
    };
    parsed.map_err(|e| CoreError::InvalidSignal(format!("{:?}: {}", text, e)))
}

/// Two-byte identity type prefix carried by every identity identifier.
///
/// The first byte selects the genesis-state algorithm, the second the
/// blockchain and network the identity lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdType(pub [u8; 2]);

impl IdType {
    /// Create an identity type from its two raw bytes.
    pub const fn new(bytes: [u8; 2]) -> Self {
        Self(bytes)
    }

    /// Raw bytes, in identifier order.
    pub fn as_bytes(&self) -> [u8; 2] {
        self.0
    }

    /// Parse from a 4-digit hex string, with or without `0x`.
    pub fn from_hex(text: &str) -> Result<Self, CoreError> {
        let digits = text.strip_prefix("0x").unwrap_or(text);
        let bytes = hex::decode(digits)?;
        let arr: [u8; 2] = bytes.as_slice().try_into().map_err(|_| {
            CoreError::InvalidIdType(format!("expected 2 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(arr))
    }
}

impl fmt::Display for IdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl TryFrom<String> for IdType {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<IdType> for String {
    fn from(value: IdType) -> Self {
        value.to_string()
    }
}

/// Names a raw signal that carries output relevant to the caller.
///
/// Returned by a successful verification so the caller can read, for example,
/// the proven user identifier or a nullifier without hardcoding offsets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisclosurePair {
    /// Signal name as registered for the circuit.
    pub name: String,
    /// 0-based position in the raw signal vector.
    pub index: usize,
}

impl DisclosurePair {
    /// Create a disclosure pair.
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }
}

impl fmt::Display for DisclosurePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.index)
    }
}
