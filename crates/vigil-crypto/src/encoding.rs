use vigil_core::{Address, U256};

/// Encode an address as a signal the way circuits expect it: the word's
/// little-endian bytes are 12 zero bytes followed by the address.
pub fn address_to_le_signal(address: Address) -> U256 {
    let mut le = [0u8; 32];
    le[12..].copy_from_slice(address.as_slice());
    U256::from_le_bytes(le)
}

/// Decode an address-shaped signal. Returns `None` when the signal has
/// nonzero bytes outside the address window.
pub fn le_signal_to_address(signal: U256) -> Option<Address> {
    let le = signal.to_le_bytes::<32>();
    if le[..12].iter().any(|b| *b != 0) {
        return None;
    }
    Some(Address::from_slice(&le[12..]))
}
