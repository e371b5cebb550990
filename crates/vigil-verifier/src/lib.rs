//! Vigil Verifier: decides whether a zero-knowledge credential proof
//! satisfies a relying party's atomic query.
//!
//! A verification call decodes the query, resolves the circuit, evaluates the
//! proof predicate, decodes the public signals by name, and then runs the
//! circuit kind's ordered checks (query binding, freshness against the
//! identity-state ledger, policy, and for V3 circuits anti-replay and caller
//! binding). The first failing check rejects the proof.

pub mod binding;
pub mod engine;
pub mod error;
pub mod freshness;
pub mod policy;
pub mod predicate;
pub mod query;
pub mod settings;
pub mod signals;

pub use engine::{VerificationEngine, VerifyRequest};
pub use error::{ErrorClass, SettingsError, VerificationError};
pub use freshness::FreshnessChecker;
pub use predicate::{CircuitProof, DigestPredicate, ProofPredicate};
pub use query::{AtomicQuery, Operator, V3QueryFields};
pub use settings::{CircuitBinding, SettingsAdmin, SettingsHandle, VerifierSettings};
pub use signals::{
    decode_common, decode_v3, CommonSignals, DecodedSignals, NamedInputRegistry, V3Signals,
};
