use std::fmt;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use vigil_core::U256;

use crate::error::CryptoError;

/// 32-byte BLAKE3 key binding signal digests to one verifying party.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DigestKey([u8; 32]);

impl DigestKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Generate a fresh random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Parse from 64 hex digits.
    pub fn from_hex(text: &str) -> Result<Self, CryptoError> {
        let digits = text.strip_prefix("0x").unwrap_or(text);
        let bytes = hex::decode(digits)
            .map_err(|e| CryptoError::InvalidInput(format!("digest key: {}", e)))?;
        let arr: [u8; 32] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: 32,
                    actual: bytes.len(),
                })?;
        Ok(Self(arr))
    }

    /// Hex encoding of the key.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

// Keys never appear in logs.
impl fmt::Debug for DigestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DigestKey(..)")
    }
}

impl TryFrom<String> for DigestKey {
    type Error = CryptoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<DigestKey> for String {
    fn from(value: DigestKey) -> Self {
        value.to_hex()
    }
}

/// Keyed BLAKE3 digest over a circuit id and its ordered public signals.
///
/// Length prefixes keep `(circuit, signals)` pairs from colliding across
/// different splits of the same bytes.
pub fn signal_digest(key: &DigestKey, circuit_id: &str, signals: &[U256]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_keyed(key.as_bytes());
    hasher.update(&(circuit_id.len() as u64).to_le_bytes());
    hasher.update(circuit_id.as_bytes());
    hasher.update(&(signals.len() as u64).to_le_bytes());
    for signal in signals {
        hasher.update(&signal.to_be_bytes::<32>());
    }
    *hasher.finalize().as_bytes()
}
