use std::fmt;

use serde::{Deserialize, Serialize};
use vigil_core::{Address, CircuitKind, U256};

/// Whether a rejection means "you sent garbage" or "your proof does not
/// satisfy policy".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Undecodable or structurally wrong input.
    Malformed,
    /// Well-formed input that fails a policy, freshness, or binding check.
    Policy,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed"),
            Self::Policy => write!(f, "policy"),
        }
    }
}

/// Every way a verification call can be rejected.
///
/// Variants carry the values that failed so a rejection can be audited from
/// its message alone.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    #[error("malformed signals: need at least {required} signals, got {actual}")]
    MalformedSignals { required: usize, actual: usize },

    #[error("signal name {name:?} is not registered for this circuit")]
    UnknownInput { name: String },

    #[error("malformed query: {0}")]
    MalformedQuery(String),

    #[error("unsupported circuit: {0}")]
    UnsupportedCircuit(String),

    #[error("proof rejected by the {circuit} verifier")]
    InvalidProof { circuit: String },

    #[error("query hash mismatch: proof commits to {proven:#x}, query declares {declared:#x}")]
    QueryHashMismatch { proven: U256, declared: U256 },

    #[error("merklized flag {merklized} inconsistent with claim path key {claim_path_key:#x}")]
    MerklizationMismatch { merklized: U256, claim_path_key: U256 },

    #[error("GIST root {root:#x} is unknown")]
    UnknownGistRoot { root: U256 },

    #[error("GIST root {root:#x} expired: superseded at {superseded_at}, now {now}, timeout {timeout}s")]
    ExpiredGistRoot {
        root: U256,
        superseded_at: u64,
        now: u64,
        timeout: u64,
    },

    #[error("issuer {issuer:#x} is not in the allowed issuer list")]
    IssuerNotAllowed { issuer: U256 },

    #[error("issuer state {state:#x} is not recorded for issuer {issuer:#x}")]
    UnknownIssuerState { issuer: U256, state: U256 },

    #[error("non-revocation state {state:#x} of unpublished issuer {issuer:#x} is not its genesis state")]
    NonGenesisRevocationState { issuer: U256, state: U256 },

    #[error("non-revocation state {state:#x} is not recorded for issuer {issuer:#x}")]
    UnknownRevocationState { issuer: U256, state: U256 },

    #[error("non-revocation state {state:#x} belongs to {owner:#x}, not issuer {issuer:#x}")]
    InvalidRevocationStateId {
        issuer: U256,
        state: U256,
        owner: U256,
    },

    #[error("non-revocation state {state:#x} of issuer {issuer:#x} has no supersession time")]
    MissingSupersessionInfo { issuer: U256, state: U256 },

    #[error("non-revocation state {state:#x} expired: superseded at {superseded_at}, now {now}, timeout {timeout}s")]
    ExpiredRevocationState {
        state: U256,
        superseded_at: u64,
        now: u64,
        timeout: u64,
    },

    #[error("revocation flag {flag} contradicts skipClaimRevocationCheck={skip}")]
    RevocationCheckMismatch { flag: U256, skip: bool },

    #[error("proof timestamp {timestamp} is later than now ({now})")]
    ProofFromFuture { timestamp: U256, now: u64 },

    #[error("proof expired: timestamp {timestamp}, now {now}, timeout {timeout}s")]
    ProofExpired { timestamp: u64, now: u64, timeout: u64 },

    #[error("verifier id mismatch: query requires {expected:#x}, proof carries {actual:#x}")]
    VerifierIdMismatch { expected: U256, actual: U256 },

    #[error("nullifier session mismatch: query requires {expected:#x}, proof carries {actual:#x}")]
    NullifierSessionMismatch { expected: U256, actual: U256 },

    #[error("invalid link group: groupID {group_id} with linkID {link_id:#x}")]
    InvalidLinkGroup { group_id: u64, link_id: U256 },

    #[error("proof type mismatch: query requires {expected}, proof carries {actual}")]
    ProofTypeMismatch { expected: u64, actual: U256 },

    #[error("nullifier session {session:#x} requested but the proof's nullifier is zero")]
    InvalidNullifier { session: U256 },

    #[error("userID {user_id:#x} is not caller {caller}'s identifier {expected:#x}")]
    CallerIdentityMismatch {
        user_id: U256,
        caller: Address,
        expected: U256,
    },

    #[error("challenge {challenge:#x} is not bound to caller {caller}")]
    ChallengeMismatch { challenge: U256, caller: Address },
}

impl VerificationError {
    /// Malformed input versus policy rejection.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::MalformedSignals { .. }
            | Self::UnknownInput { .. }
            | Self::MalformedQuery(_)
            | Self::UnsupportedCircuit(_) => ErrorClass::Malformed,
            _ => ErrorClass::Policy,
        }
    }

    /// Stable snake_case code for the rejection kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedSignals { .. } => "malformed_signals",
            Self::UnknownInput { .. } => "unknown_input",
            Self::MalformedQuery(_) => "malformed_query",
            Self::UnsupportedCircuit(_) => "unsupported_circuit",
            Self::InvalidProof { .. } => "invalid_proof",
            Self::QueryHashMismatch { .. } => "query_hash_mismatch",
            Self::MerklizationMismatch { .. } => "merklization_mismatch",
            Self::UnknownGistRoot { .. } => "unknown_gist_root",
            Self::ExpiredGistRoot { .. } => "expired_gist_root",
            Self::IssuerNotAllowed { .. } => "issuer_not_allowed",
            Self::UnknownIssuerState { .. } => "unknown_issuer_state",
            Self::NonGenesisRevocationState { .. } => "non_genesis_revocation_state",
            Self::UnknownRevocationState { .. } => "unknown_revocation_state",
            Self::InvalidRevocationStateId { .. } => "invalid_revocation_state_id",
            Self::MissingSupersessionInfo { .. } => "missing_supersession_info",
            Self::ExpiredRevocationState { .. } => "expired_revocation_state",
            Self::RevocationCheckMismatch { .. } => "revocation_check_mismatch",
            Self::ProofFromFuture { .. } => "proof_from_future",
            Self::ProofExpired { .. } => "proof_expired",
            Self::VerifierIdMismatch { .. } => "verifier_id_mismatch",
            Self::NullifierSessionMismatch { .. } => "nullifier_session_mismatch",
            Self::InvalidLinkGroup { .. } => "invalid_link_group",
            Self::ProofTypeMismatch { .. } => "proof_type_mismatch",
            Self::InvalidNullifier { .. } => "invalid_nullifier",
            Self::CallerIdentityMismatch { .. } => "caller_identity_mismatch",
            Self::ChallengeMismatch { .. } => "challenge_mismatch",
        }
    }
}

/// Errors from the administrative settings path.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("signal name {0:?} is registered twice")]
    DuplicateInput(String),

    #[error("circuit {circuit} is missing required signal {name:?}")]
    MissingInput { circuit: String, name: String },

    #[error("circuit {0} has no built-in signal layout; register its inputs explicitly")]
    NoDefaultLayout(String),

    #[error("circuit {circuit} is a {expected} circuit, not {requested}")]
    KindMismatch {
        circuit: String,
        expected: CircuitKind,
        requested: CircuitKind,
    },

    #[error("circuit {0} is not registered")]
    UnknownCircuit(String),
}
