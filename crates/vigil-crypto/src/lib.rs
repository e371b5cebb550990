//! Vigil Crypto: the deterministic derivations the verifier relies on:
//! genesis identity identifiers, address-shaped signals, and keyed BLAKE3
//! digests over public signals.

pub mod digest;
pub mod encoding;
pub mod error;
pub mod genesis;

pub use digest::{signal_digest, DigestKey};
pub use encoding::{address_to_le_signal, le_signal_to_address};
pub use error::CryptoError;
pub use genesis::{
    checksum, id_from_address, id_from_genesis_state, id_type_of, ChecksumIdentity,
    IdentityDerivation,
};
