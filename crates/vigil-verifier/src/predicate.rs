use serde::{Deserialize, Serialize};
use vigil_core::U256;
use vigil_crypto::{signal_digest, DigestKey};

/// Groth16-shaped proof elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitProof {
    pub a: [U256; 2],
    pub b: [[U256; 2]; 2],
    pub c: [U256; 2],
}

/// Checks that a proof is valid for a circuit's public signals.
///
/// The verifier treats this as a black box; one predicate is bound per
/// registered circuit.
pub trait ProofPredicate: Send + Sync {
    fn verify(&self, proof: &CircuitProof, signals: &[U256]) -> bool;
}

impl<F> ProofPredicate for F
where
    F: Fn(&CircuitProof, &[U256]) -> bool + Send + Sync,
{
    fn verify(&self, proof: &CircuitProof, signals: &[U256]) -> bool {
        self(proof, signals)
    }
}

/// Predicate that accepts a proof whose `a[0]` is the keyed BLAKE3 digest of
/// the circuit id and signals, and whose other elements are zero.
///
/// Whoever holds the key can produce proofs, so this stands in for a real
/// zk verifier in development deployments and tests.
#[derive(Debug, Clone)]
pub struct DigestPredicate {
    circuit_id: String,
    key: DigestKey,
}

impl DigestPredicate {
    pub fn new(circuit_id: impl Into<String>, key: DigestKey) -> Self {
        Self {
            circuit_id: circuit_id.into(),
            key,
        }
    }

    /// Produce the proof this predicate accepts for `signals`.
    pub fn prove(&self, signals: &[U256]) -> CircuitProof {
        CircuitProof {
            a: [self.commitment(signals), U256::ZERO],
            ..CircuitProof::default()
        }
    }

    pub fn circuit_id(&self) -> &str {
        &self.circuit_id
    }

    fn commitment(&self, signals: &[U256]) -> U256 {
        U256::from_be_bytes(signal_digest(&self.key, &self.circuit_id, signals))
    }
}

impl ProofPredicate for DigestPredicate {
    fn verify(&self, proof: &CircuitProof, signals: &[U256]) -> bool {
        proof == &self.prove(signals)
    }
}
