use vigil_core::{Signal, VerifierConfig};
use vigil_crypto::IdentityDerivation;
use vigil_state::StateOracle;

use crate::error::VerificationError;

/// Staleness checks against one ledger snapshot.
///
/// `now` comes from the same snapshot the records are read from.
pub struct FreshnessChecker<'a> {
    oracle: &'a dyn StateOracle,
    identity: &'a dyn IdentityDerivation,
    config: &'a VerifierConfig,
    now: u64,
}

impl<'a> FreshnessChecker<'a> {
    pub fn new(
        oracle: &'a dyn StateOracle,
        identity: &'a dyn IdentityDerivation,
        config: &'a VerifierConfig,
    ) -> Self {
        Self {
            oracle,
            identity,
            config,
            now: oracle.timestamp(),
        }
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    /// Seconds since `superseded_at`; zero if it lies in the future.
    fn staleness(&self, superseded_at: u64) -> u64 {
        self.now.saturating_sub(superseded_at)
    }

    /// The root must have been current at some point and, if superseded,
    /// not for longer than the GIST root timeout.
    pub fn check_gist_root(&self, root: Signal) -> Result<(), VerificationError> {
        let info = self
            .oracle
            .gist_root_info(root)
            .ok_or(VerificationError::UnknownGistRoot { root })?;

        if let Some(superseded_at) = info.superseded_at {
            let timeout = self.config.gist_root_expiration_secs;
            if self.staleness(superseded_at) > timeout {
                return Err(VerificationError::ExpiredGistRoot {
                    root,
                    superseded_at,
                    now: self.now,
                    timeout,
                });
            }
        }
        Ok(())
    }

    /// The issuer's signing state must be its genesis state or a recorded
    /// transition of that issuer.
    pub fn check_issuer_state(
        &self,
        issuer: Signal,
        state: Signal,
    ) -> Result<(), VerificationError> {
        if self.identity.is_genesis_state(issuer, state) {
            return Ok(());
        }
        match self.oracle.state_info_by_id_and_state(issuer, state) {
            Some(info) if info.id == issuer && info.state == state => Ok(()),
            _ => Err(VerificationError::UnknownIssuerState { issuer, state }),
        }
    }

    /// The state the non-revocation proof was made against must be current,
    /// or superseded for no longer than the revocation-state timeout.
    pub fn check_nonrevocation_state(
        &self,
        issuer: Signal,
        state: Signal,
    ) -> Result<(), VerificationError> {
        if !self.oracle.id_exists(issuer) {
            if self.identity.is_genesis_state(issuer, state) {
                return Ok(());
            }
            return Err(VerificationError::NonGenesisRevocationState { issuer, state });
        }

        if let Some(current) = self.oracle.state_info_by_id(issuer) {
            if current.state == state {
                return Ok(());
            }
        }

        let info = self
            .oracle
            .state_info_by_id_and_state(issuer, state)
            .ok_or(VerificationError::UnknownRevocationState { issuer, state })?;
        if info.id != issuer {
            return Err(VerificationError::InvalidRevocationStateId {
                issuer,
                state,
                owner: info.id,
            });
        }
        let superseded_at = info
            .superseded_at
            .ok_or(VerificationError::MissingSupersessionInfo { issuer, state })?;

        let timeout = self.config.revocation_state_expiration_secs;
        if self.staleness(superseded_at) > timeout {
            return Err(VerificationError::ExpiredRevocationState {
                state,
                superseded_at,
                now: self.now,
                timeout,
            });
        }
        Ok(())
    }
}
