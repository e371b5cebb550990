use serde::{Deserialize, Serialize};

/// Operator code reserved for selective disclosure of the queried value.
pub const SELECTIVE_DISCLOSURE_OPERATOR: u64 = 16;

/// Policy knobs of the verifier that are independent of any circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// How long a superseded non-revocation state stays acceptable, in seconds.
    #[serde(default = "default_expiration_secs")]
    pub revocation_state_expiration_secs: u64,
    /// Maximum age of a proof's timestamp signal, in seconds.
    #[serde(default = "default_expiration_secs")]
    pub proof_expiration_secs: u64,
    /// How long a superseded GIST root stays acceptable, in seconds.
    #[serde(default = "default_expiration_secs")]
    pub gist_root_expiration_secs: u64,
    /// Operator code that requests disclosure of the operator output.
    #[serde(default = "default_selective_disclosure_operator")]
    pub selective_disclosure_operator: u64,
}

fn default_expiration_secs() -> u64 {
    3600
}
fn default_selective_disclosure_operator() -> u64 {
    SELECTIVE_DISCLOSURE_OPERATOR
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            revocation_state_expiration_secs: default_expiration_secs(),
            proof_expiration_secs: default_expiration_secs(),
            gist_root_expiration_secs: default_expiration_secs(),
            selective_disclosure_operator: default_selective_disclosure_operator(),
        }
    }
}
