//! Checks of the proof's signals against the relying party's query.

use vigil_core::{Signal, U256};

use crate::error::VerificationError;
use crate::query::AtomicQuery;

/// The proof must commit to exactly the query the relying party declared.
pub fn check_query_hash_binding(
    query: &AtomicQuery,
    circuit_query_hash: Signal,
) -> Result<(), VerificationError> {
    if circuit_query_hash != query.query_hash {
        return Err(VerificationError::QueryHashMismatch {
            proven: circuit_query_hash,
            declared: query.query_hash,
        });
    }
    Ok(())
}

/// `merklized` is 1 exactly when the query uses a claim path.
pub fn check_merklized_consistency(
    query: &AtomicQuery,
    merklized: Signal,
) -> Result<(), VerificationError> {
    let expected = if query.claim_path_key.is_zero() {
        U256::ZERO
    } else {
        U256::from(1u64)
    };
    if merklized != expected {
        return Err(VerificationError::MerklizationMismatch {
            merklized,
            claim_path_key: query.claim_path_key,
        });
    }
    Ok(())
}

/// An empty allow-list accepts any issuer.
pub fn check_allowed_issuers(query: &AtomicQuery, issuer: Signal) -> Result<(), VerificationError> {
    if query.allowed_issuers.is_empty() || query.allowed_issuers.contains(&issuer) {
        return Ok(());
    }
    Err(VerificationError::IssuerNotAllowed { issuer })
}

/// The revocation flag is 0 when the query skips the check and 1 otherwise.
pub fn check_revocation_flag(
    query: &AtomicQuery,
    is_revocation_checked: Signal,
) -> Result<(), VerificationError> {
    let expected = if query.skip_claim_revocation_check {
        U256::ZERO
    } else {
        U256::from(1u64)
    };
    if is_revocation_checked != expected {
        return Err(VerificationError::RevocationCheckMismatch {
            flag: is_revocation_checked,
            skip: query.skip_claim_revocation_check,
        });
    }
    Ok(())
}

/// The proof must not be from the future nor older than `timeout` seconds.
pub fn check_proof_recency(
    timestamp: Signal,
    now: u64,
    timeout: u64,
) -> Result<(), VerificationError> {
    if timestamp > U256::from(now) {
        return Err(VerificationError::ProofFromFuture { timestamp, now });
    }
    // Fits in a u64: it is no greater than `now`.
    let timestamp = timestamp.as_limbs()[0];
    if now - timestamp > timeout {
        return Err(VerificationError::ProofExpired {
            timestamp,
            now,
            timeout,
        });
    }
    Ok(())
}
