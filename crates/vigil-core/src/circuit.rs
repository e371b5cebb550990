use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// On-chain signature-based atomic query circuit (common layout).
pub const CREDENTIAL_ATOMIC_QUERY_SIG_V2_ON_CHAIN: &str = "credentialAtomicQuerySigV2OnChain";

/// On-chain merkle-tree-proof atomic query circuit (common layout).
pub const CREDENTIAL_ATOMIC_QUERY_MTP_V2_ON_CHAIN: &str = "credentialAtomicQueryMTPV2OnChain";

/// On-chain V3 atomic query circuit with nullifiers, linking, and proof-type selection.
pub const CREDENTIAL_ATOMIC_QUERY_V3_ON_CHAIN: &str = "credentialAtomicQueryV3OnChain-beta.1";

/// The circuit families the verifier knows how to decode and check.
///
/// Each kind owns its signal layout and its ordered check list; adding a
/// circuit family means adding a variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitKind {
    /// Base layout shared by the V2 signature and MTP circuits.
    Common,
    /// Extended layout: link ids, nullifiers, proof-type and verifier binding.
    V3,
}

impl CircuitKind {
    /// Whether the kind carries the V3 signal and query extensions.
    pub fn is_v3(&self) -> bool {
        matches!(self, Self::V3)
    }

    /// The kind of a well-known circuit id, if it is one.
    pub fn of_known_circuit(circuit_id: &str) -> Option<Self> {
        match circuit_id {
            CREDENTIAL_ATOMIC_QUERY_SIG_V2_ON_CHAIN | CREDENTIAL_ATOMIC_QUERY_MTP_V2_ON_CHAIN => {
                Some(Self::Common)
            }
            CREDENTIAL_ATOMIC_QUERY_V3_ON_CHAIN => Some(Self::V3),
            _ => None,
        }
    }
}

impl fmt::Display for CircuitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Common => write!(f, "common"),
            Self::V3 => write!(f, "v3"),
        }
    }
}

impl FromStr for CircuitKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "common" => Ok(Self::Common),
            "v3" => Ok(Self::V3),
            other => Err(CoreError::UnknownCircuitKind(other.to_string())),
        }
    }
}

/// All circuit ids with a built-in signal layout.
pub fn known_circuits() -> [&'static str; 3] {
    [
        CREDENTIAL_ATOMIC_QUERY_SIG_V2_ON_CHAIN,
        CREDENTIAL_ATOMIC_QUERY_MTP_V2_ON_CHAIN,
        CREDENTIAL_ATOMIC_QUERY_V3_ON_CHAIN,
    ]
}
