use vigil_core::{Address, IdType, U256};

use crate::encoding::address_to_le_signal;

/// Bytes of the genesis state embedded in an identifier.
const GENESIS_LEN: usize = 27;

/// Identifier layout: type (2) | genesis (27) | checksum (2).
const CHECKSUM_OFFSET: usize = 2 + GENESIS_LEN;

/// Deterministic identifier derivations the verifier treats as a black box.
pub trait IdentityDerivation: Send + Sync {
    /// Whether `state` is exactly the genesis state `id` was derived from.
    fn is_genesis_state(&self, id: U256, state: U256) -> bool;

    /// Identifier owned by an address-shaped principal under `id_type`.
    fn derive_identifier_from_principal(&self, id_type: IdType, principal: Address) -> U256;
}

/// Identifier scheme with a byte-sum checksum.
///
/// An identifier is the little-endian word
/// `type ‖ state_le[5..32] ‖ checksum`, where `checksum` is the 16-bit
/// little-endian sum of the preceding 29 bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChecksumIdentity;

impl IdentityDerivation for ChecksumIdentity {
    fn is_genesis_state(&self, id: U256, state: U256) -> bool {
        id == id_from_genesis_state(id_type_of(id), state)
    }

    fn derive_identifier_from_principal(&self, id_type: IdType, principal: Address) -> U256 {
        id_from_address(id_type, principal)
    }
}

/// 16-bit wrapping byte sum, little-endian.
pub fn checksum(bytes: &[u8]) -> [u8; 2] {
    bytes
        .iter()
        .fold(0u16, |acc, b| acc.wrapping_add(u16::from(*b)))
        .to_le_bytes()
}

/// The identity type prefix of an identifier.
pub fn id_type_of(id: U256) -> IdType {
    let le = id.to_le_bytes::<32>();
    IdType::new([le[0], le[1]])
}

/// Identifier whose genesis state is `state`.
pub fn id_from_genesis_state(id_type: IdType, state: U256) -> U256 {
    let state_le = state.to_le_bytes::<32>();

    let mut id = [0u8; 32];
    id[..2].copy_from_slice(&id_type.as_bytes());
    id[2..CHECKSUM_OFFSET].copy_from_slice(&state_le[32 - GENESIS_LEN..]);
    let sum = checksum(&id[..CHECKSUM_OFFSET]);
    id[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 2].copy_from_slice(&sum);

    U256::from_le_bytes(id)
}

/// Identifier of an address-controlled identity.
///
/// The address occupies the last 20 genesis bytes, preceded by 7 zero bytes.
pub fn id_from_address(id_type: IdType, address: Address) -> U256 {
    id_from_genesis_state(id_type, address_to_le_signal(address))
}
