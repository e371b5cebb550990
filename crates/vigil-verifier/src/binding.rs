//! Anti-replay and caller-binding checks for V3 circuits.

use vigil_core::{Address, IdType, Signal, U256};
use vigil_crypto::{le_signal_to_address, IdentityDerivation};

use crate::error::VerificationError;
use crate::freshness::FreshnessChecker;
use crate::query::V3QueryFields;

/// A nonzero `verifierID` in the query pins the proof to that verifier.
pub fn check_verifier_binding(
    query: &V3QueryFields,
    verifier_id: Signal,
) -> Result<(), VerificationError> {
    if !query.verifier_id.is_zero() && query.verifier_id != verifier_id {
        return Err(VerificationError::VerifierIdMismatch {
            expected: query.verifier_id,
            actual: verifier_id,
        });
    }
    Ok(())
}

/// The nullifier session must match exactly, zero included.
pub fn check_nullifier_session_binding(
    query: &V3QueryFields,
    nullifier_session_id: Signal,
) -> Result<(), VerificationError> {
    if query.nullifier_session_id != nullifier_session_id {
        return Err(VerificationError::NullifierSessionMismatch {
            expected: query.nullifier_session_id,
            actual: nullifier_session_id,
        });
    }
    Ok(())
}

/// `groupID` and `linkID` are both zero or both nonzero.
pub fn check_link_group(query: &V3QueryFields, link_id: Signal) -> Result<(), VerificationError> {
    if (query.group_id == 0) != link_id.is_zero() {
        return Err(VerificationError::InvalidLinkGroup {
            group_id: query.group_id,
            link_id,
        });
    }
    Ok(())
}

/// A nonzero `proofType` in the query must match the proof's.
pub fn check_proof_type(query: &V3QueryFields, proof_type: Signal) -> Result<(), VerificationError> {
    if query.proof_type != 0 && U256::from(query.proof_type) != proof_type {
        return Err(VerificationError::ProofTypeMismatch {
            expected: query.proof_type,
            actual: proof_type,
        });
    }
    Ok(())
}

/// A nullifier session requires a nonzero nullifier.
pub fn check_nullifier_presence(
    nullifier: Signal,
    nullifier_session_id: Signal,
) -> Result<(), VerificationError> {
    if !nullifier_session_id.is_zero() && nullifier.is_zero() {
        return Err(VerificationError::InvalidNullifier {
            session: nullifier_session_id,
        });
    }
    Ok(())
}

/// With BJJ auth the circuit proved key ownership against the GIST root,
/// which must be fresh. Without it, `userID` must be the caller's own
/// address-derived identifier.
pub fn check_identity_binding(
    freshness: &FreshnessChecker<'_>,
    identity: &dyn IdentityDerivation,
    default_id_type: IdType,
    is_bjj_auth_enabled: Signal,
    gist_root: Signal,
    user_id: Signal,
    caller: Address,
) -> Result<(), VerificationError> {
    if is_bjj_auth_enabled == U256::from(1u64) {
        return freshness.check_gist_root(gist_root);
    }
    let expected = identity.derive_identifier_from_principal(default_id_type, caller);
    if user_id != expected {
        return Err(VerificationError::CallerIdentityMismatch {
            user_id,
            caller,
            expected,
        });
    }
    Ok(())
}

/// The challenge must encode the caller's address.
pub fn check_challenge_binding(challenge: Signal, caller: Address) -> Result<(), VerificationError> {
    if le_signal_to_address(challenge) != Some(caller) {
        return Err(VerificationError::ChallengeMismatch { challenge, caller });
    }
    Ok(())
}
