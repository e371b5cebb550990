use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use vigil_core::circuit::{
    CREDENTIAL_ATOMIC_QUERY_MTP_V2_ON_CHAIN, CREDENTIAL_ATOMIC_QUERY_SIG_V2_ON_CHAIN,
    CREDENTIAL_ATOMIC_QUERY_V3_ON_CHAIN,
};
use vigil_core::{CircuitKind, Signal};

use crate::error::{SettingsError, VerificationError};

/// Public-signal names.
pub mod names {
    pub const MERKLIZED: &str = "merklized";
    pub const USER_ID: &str = "userID";
    pub const ISSUER_STATE: &str = "issuerState";
    pub const CIRCUIT_QUERY_HASH: &str = "circuitQueryHash";
    pub const REQUEST_ID: &str = "requestID";
    pub const CHALLENGE: &str = "challenge";
    pub const GIST_ROOT: &str = "gistRoot";
    pub const ISSUER_ID: &str = "issuerID";
    pub const IS_REVOCATION_CHECKED: &str = "isRevocationChecked";
    pub const ISSUER_CLAIM_NON_REV_STATE: &str = "issuerClaimNonRevState";
    pub const TIMESTAMP: &str = "timestamp";

    pub const LINK_ID: &str = "linkID";
    pub const NULLIFIER: &str = "nullifier";
    pub const OPERATOR_OUTPUT: &str = "operatorOutput";
    pub const PROOF_TYPE: &str = "proofType";
    pub const VERIFIER_ID: &str = "verifierID";
    pub const NULLIFIER_SESSION_ID: &str = "nullifierSessionID";
    pub const IS_BJJ_AUTH_ENABLED: &str = "isBJJAuthEnabled";
}

const COMMON_INPUTS: [&str; 11] = [
    names::MERKLIZED,
    names::USER_ID,
    names::ISSUER_STATE,
    names::CIRCUIT_QUERY_HASH,
    names::REQUEST_ID,
    names::CHALLENGE,
    names::GIST_ROOT,
    names::ISSUER_ID,
    names::IS_REVOCATION_CHECKED,
    names::ISSUER_CLAIM_NON_REV_STATE,
    names::TIMESTAMP,
];

const V3_EXTRA_INPUTS: [&str; 7] = [
    names::LINK_ID,
    names::NULLIFIER,
    names::OPERATOR_OUTPUT,
    names::PROOF_TYPE,
    names::VERIFIER_ID,
    names::NULLIFIER_SESSION_ID,
    names::IS_BJJ_AUTH_ENABLED,
];

const SIG_V2_LAYOUT: [&str; 11] = [
    names::MERKLIZED,
    names::USER_ID,
    names::CIRCUIT_QUERY_HASH,
    names::ISSUER_STATE,
    names::REQUEST_ID,
    names::CHALLENGE,
    names::GIST_ROOT,
    names::ISSUER_ID,
    names::IS_REVOCATION_CHECKED,
    names::ISSUER_CLAIM_NON_REV_STATE,
    names::TIMESTAMP,
];

const MTP_V2_LAYOUT: [&str; 11] = [
    names::MERKLIZED,
    names::USER_ID,
    names::CIRCUIT_QUERY_HASH,
    names::REQUEST_ID,
    names::CHALLENGE,
    names::GIST_ROOT,
    names::ISSUER_ID,
    names::ISSUER_STATE,
    names::IS_REVOCATION_CHECKED,
    names::ISSUER_CLAIM_NON_REV_STATE,
    names::TIMESTAMP,
];

const V3_LAYOUT: [&str; 18] = [
    names::USER_ID,
    names::CIRCUIT_QUERY_HASH,
    names::ISSUER_STATE,
    names::LINK_ID,
    names::NULLIFIER,
    names::OPERATOR_OUTPUT,
    names::PROOF_TYPE,
    names::REQUEST_ID,
    names::CHALLENGE,
    names::GIST_ROOT,
    names::ISSUER_ID,
    names::IS_REVOCATION_CHECKED,
    names::ISSUER_CLAIM_NON_REV_STATE,
    names::TIMESTAMP,
    names::IS_BJJ_AUTH_ENABLED,
    names::VERIFIER_ID,
    names::NULLIFIER_SESSION_ID,
    names::MERKLIZED,
];

/// Built-in signal order of a known circuit.
pub fn default_layout(circuit_id: &str) -> Option<&'static [&'static str]> {
    match circuit_id {
        CREDENTIAL_ATOMIC_QUERY_SIG_V2_ON_CHAIN => Some(&SIG_V2_LAYOUT),
        CREDENTIAL_ATOMIC_QUERY_MTP_V2_ON_CHAIN => Some(&MTP_V2_LAYOUT),
        CREDENTIAL_ATOMIC_QUERY_V3_ON_CHAIN => Some(&V3_LAYOUT),
        _ => None,
    }
}

/// Signal names a circuit of the given kind must register.
pub fn required_inputs(kind: CircuitKind) -> Vec<&'static str> {
    let mut required = COMMON_INPUTS.to_vec();
    if kind.is_v3() {
        required.extend_from_slice(&V3_EXTRA_INPUTS);
    }
    required
}

/// Maps public-signal names to their position in a circuit's raw signal
/// vector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedInputRegistry {
    inputs: BTreeMap<String, usize>,
}

impl NamedInputRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry where each name sits at its position in `names`.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, SettingsError> {
        let mut registry = Self::new();
        for (index, name) in names.iter().enumerate() {
            registry.register(name.as_ref(), index)?;
        }
        Ok(registry)
    }

    /// Registry for a known circuit's built-in layout.
    pub fn for_known_circuit(circuit_id: &str) -> Option<Self> {
        let layout = default_layout(circuit_id)?;
        let inputs = layout
            .iter()
            .enumerate()
            .map(|(index, name)| (name.to_string(), index))
            .collect();
        Some(Self { inputs })
    }

    /// Add one name. A name maps to exactly one index.
    pub fn register(&mut self, name: &str, index: usize) -> Result<(), SettingsError> {
        if self.inputs.contains_key(name) {
            return Err(SettingsError::DuplicateInput(name.to_string()));
        }
        self.inputs.insert(name.to_string(), index);
        Ok(())
    }

    /// Position of `name`, if registered.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.inputs.get(name).copied()
    }

    /// Position of `name`, or `UnknownInput`.
    pub fn require(&self, name: &str) -> Result<usize, VerificationError> {
        self.index_of(name)
            .ok_or_else(|| VerificationError::UnknownInput {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inputs.contains_key(name)
    }

    /// Minimum signal-vector length this registry can decode.
    pub fn required_len(&self) -> usize {
        self.inputs.values().max().map_or(0, |max| max + 1)
    }

    /// Registered names in index order.
    pub fn names(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<_> = self
            .inputs
            .iter()
            .map(|(name, index)| (name.as_str(), *index))
            .collect();
        entries.sort_by_key(|(_, index)| *index);
        entries
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Fails with the first name `kind` needs that is not registered.
    pub fn validate_for(&self, circuit_id: &str, kind: CircuitKind) -> Result<(), SettingsError> {
        match required_inputs(kind)
            .into_iter()
            .find(|name| !self.contains(name))
        {
            Some(name) => Err(SettingsError::MissingInput {
                circuit: circuit_id.to_string(),
                name: name.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn value(&self, signals: &[Signal], name: &str) -> Result<Signal, VerificationError> {
        let index = self.require(name)?;
        signals
            .get(index)
            .copied()
            .ok_or(VerificationError::MalformedSignals {
                required: index + 1,
                actual: signals.len(),
            })
    }

    fn check_len(&self, signals: &[Signal]) -> Result<(), VerificationError> {
        let required = self.required_len();
        if signals.len() < required {
            return Err(VerificationError::MalformedSignals {
                required,
                actual: signals.len(),
            });
        }
        Ok(())
    }
}

/// Signals every circuit exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonSignals {
    pub merklized: Signal,
    pub user_id: Signal,
    pub issuer_state: Signal,
    pub circuit_query_hash: Signal,
    pub request_id: Signal,
    pub challenge: Signal,
    pub gist_root: Signal,
    pub issuer_id: Signal,
    pub is_revocation_checked: Signal,
    pub issuer_claim_non_rev_state: Signal,
    pub timestamp: Signal,
}

/// Signals of V3 circuits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct V3Signals {
    pub common: CommonSignals,
    pub link_id: Signal,
    pub nullifier: Signal,
    pub operator_output: Signal,
    pub proof_type: Signal,
    pub verifier_id: Signal,
    pub nullifier_session_id: Signal,
    pub is_bjj_auth_enabled: Signal,
}

/// Decoded signals of either circuit kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedSignals {
    Common(CommonSignals),
    V3(V3Signals),
}

impl DecodedSignals {
    /// Decode according to `kind`.
    pub fn decode(
        kind: CircuitKind,
        registry: &NamedInputRegistry,
        signals: &[Signal],
    ) -> Result<Self, VerificationError> {
        match kind {
            CircuitKind::Common => decode_common(registry, signals).map(Self::Common),
            CircuitKind::V3 => decode_v3(registry, signals).map(Self::V3),
        }
    }

    pub fn common(&self) -> &CommonSignals {
        match self {
            Self::Common(common) => common,
            Self::V3(v3) => &v3.common,
        }
    }
}

/// Decode the common signals by name.
pub fn decode_common(
    registry: &NamedInputRegistry,
    signals: &[Signal],
) -> Result<CommonSignals, VerificationError> {
    registry.check_len(signals)?;
    Ok(CommonSignals {
        merklized: registry.value(signals, names::MERKLIZED)?,
        user_id: registry.value(signals, names::USER_ID)?,
        issuer_state: registry.value(signals, names::ISSUER_STATE)?,
        circuit_query_hash: registry.value(signals, names::CIRCUIT_QUERY_HASH)?,
        request_id: registry.value(signals, names::REQUEST_ID)?,
        challenge: registry.value(signals, names::CHALLENGE)?,
        gist_root: registry.value(signals, names::GIST_ROOT)?,
        issuer_id: registry.value(signals, names::ISSUER_ID)?,
        is_revocation_checked: registry.value(signals, names::IS_REVOCATION_CHECKED)?,
        issuer_claim_non_rev_state: registry.value(signals, names::ISSUER_CLAIM_NON_REV_STATE)?,
        timestamp: registry.value(signals, names::TIMESTAMP)?,
    })
}

/// Decode common plus V3 signals by name.
pub fn decode_v3(
    registry: &NamedInputRegistry,
    signals: &[Signal],
) -> Result<V3Signals, VerificationError> {
    let common = decode_common(registry, signals)?;
    Ok(V3Signals {
        common,
        link_id: registry.value(signals, names::LINK_ID)?,
        nullifier: registry.value(signals, names::NULLIFIER)?,
        operator_output: registry.value(signals, names::OPERATOR_OUTPUT)?,
        proof_type: registry.value(signals, names::PROOF_TYPE)?,
        verifier_id: registry.value(signals, names::VERIFIER_ID)?,
        nullifier_session_id: registry.value(signals, names::NULLIFIER_SESSION_ID)?,
        is_bjj_auth_enabled: registry.value(signals, names::IS_BJJ_AUTH_ENABLED)?,
    })
}
