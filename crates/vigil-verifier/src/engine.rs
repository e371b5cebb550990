use std::sync::Arc;

use tracing::{debug, info, warn};
use vigil_core::{Address, CircuitKind, DisclosurePair, Signal, VerifierConfig};
use vigil_crypto::{ChecksumIdentity, IdentityDerivation};
use vigil_state::StateOracle;

use crate::binding;
use crate::error::VerificationError;
use crate::freshness::FreshnessChecker;
use crate::policy;
use crate::predicate::CircuitProof;
use crate::query::AtomicQuery;
use crate::settings::{CircuitBinding, SettingsHandle, VerifierSettings};
use crate::signals::{names, CommonSignals, DecodedSignals, NamedInputRegistry, V3Signals};

/// One verification call's inputs.
#[derive(Debug, Clone)]
pub struct VerifyRequest {
    pub proof: CircuitProof,
    pub signals: Vec<Signal>,
    /// Protobuf-encoded [`AtomicQuery`].
    pub query: Vec<u8>,
    /// Who submitted the proof.
    pub caller: Address,
}

type Stage<'a> = (
    &'static str,
    Box<dyn Fn() -> Result<(), VerificationError> + 'a>,
);

fn stage<'a>(
    name: &'static str,
    check: impl Fn() -> Result<(), VerificationError> + 'a,
) -> Stage<'a> {
    (name, Box::new(check))
}

/// Stateless credential-proof verifier.
///
/// Every call reads one settings version and one ledger snapshot, so
/// identical inputs against the same snapshot always give the same answer.
#[derive(Clone)]
pub struct VerificationEngine {
    settings: SettingsHandle,
    identity: Arc<dyn IdentityDerivation>,
}

impl VerificationEngine {
    /// Engine using the checksum identifier scheme.
    pub fn new(settings: SettingsHandle) -> Self {
        Self::with_identity(settings, Arc::new(ChecksumIdentity))
    }

    pub fn with_identity(settings: SettingsHandle, identity: Arc<dyn IdentityDerivation>) -> Self {
        Self { settings, identity }
    }

    pub fn settings(&self) -> Arc<VerifierSettings> {
        self.settings.snapshot()
    }

    /// Verify a proof against a query for `caller`, returning the positions
    /// of the signals the caller may read.
    pub fn verify(
        &self,
        request: &VerifyRequest,
        oracle: &dyn StateOracle,
    ) -> Result<Vec<DisclosurePair>, VerificationError> {
        let settings = self.settings.snapshot();
        let query =
            AtomicQuery::decode(&request.query).map_err(|e| rejected("", request.caller, e))?;
        let circuit = query.circuit_ids.first().map(String::as_str).unwrap_or("");

        match self.verify_query(&settings, &query, request, oracle) {
            Ok(disclosures) => {
                info!(
                    circuit,
                    caller = %request.caller,
                    disclosures = disclosures.len(),
                    settings_version = settings.version,
                    "proof verified"
                );
                Ok(disclosures)
            }
            Err(e) => Err(rejected(circuit, request.caller, e)),
        }
    }

    fn verify_query(
        &self,
        settings: &VerifierSettings,
        query: &AtomicQuery,
        request: &VerifyRequest,
        oracle: &dyn StateOracle,
    ) -> Result<Vec<DisclosurePair>, VerificationError> {
        let circuit_id = query.circuit_id()?;
        let circuit = settings
            .circuit(circuit_id)
            .ok_or_else(|| VerificationError::UnsupportedCircuit(circuit_id.to_string()))?;
        query.check_kind(circuit.kind)?;

        if !circuit.predicate.verify(&request.proof, &request.signals) {
            return Err(VerificationError::InvalidProof {
                circuit: circuit_id.to_string(),
            });
        }
        debug!(circuit = circuit_id, "proof predicate passed");

        let decoded = DecodedSignals::decode(circuit.kind, &circuit.inputs, &request.signals)?;
        let freshness = FreshnessChecker::new(oracle, self.identity.as_ref(), &settings.config);

        let mut stages = common_stages(query, decoded.common(), &freshness, &settings.config);
        if let DecodedSignals::V3(v3) = &decoded {
            stages.extend(v3_stages(
                query,
                v3,
                &freshness,
                self.identity.as_ref(),
                oracle,
                request.caller,
            ));
        }
        run_stages(circuit_id, &stages)?;

        disclosures(settings, circuit, query)
    }

    /// Index of a named signal in a registered circuit's layout.
    pub fn input_index(&self, circuit_id: &str, name: &str) -> Result<usize, VerificationError> {
        let settings = self.settings.snapshot();
        let circuit = settings
            .circuit(circuit_id)
            .ok_or_else(|| VerificationError::UnsupportedCircuit(circuit_id.to_string()))?;
        circuit.inputs.require(name)
    }

    /// Value of a named signal.
    pub fn signal_value(
        &self,
        circuit_id: &str,
        name: &str,
        signals: &[Signal],
    ) -> Result<Signal, VerificationError> {
        let index = self.input_index(circuit_id, name)?;
        signals
            .get(index)
            .copied()
            .ok_or(VerificationError::MalformedSignals {
                required: index + 1,
                actual: signals.len(),
            })
    }
}

fn common_stages<'a>(
    query: &'a AtomicQuery,
    signals: &'a CommonSignals,
    freshness: &'a FreshnessChecker<'a>,
    config: &'a VerifierConfig,
) -> Vec<Stage<'a>> {
    vec![
        stage(
            "query hash",
            move || policy::check_query_hash_binding(query, signals.circuit_query_hash),
        ),
        stage(
            "merklized",
            move || policy::check_merklized_consistency(query, signals.merklized),
        ),
        stage(
            "gist root",
            move || freshness.check_gist_root(signals.gist_root),
        ),
        stage(
            "allowed issuers",
            move || policy::check_allowed_issuers(query, signals.issuer_id),
        ),
        stage(
            "issuer state",
            move || freshness.check_issuer_state(signals.issuer_id, signals.issuer_state),
        ),
        stage(
            "non-revocation state",
            move || {
                freshness.check_nonrevocation_state(
                    signals.issuer_id,
                    signals.issuer_claim_non_rev_state,
                )
            },
        ),
        stage(
            "proof recency",
            move || {
                policy::check_proof_recency(
                    signals.timestamp,
                    freshness.now(),
                    config.proof_expiration_secs,
                )
            },
        ),
        stage(
            "revocation flag",
            move || policy::check_revocation_flag(query, signals.is_revocation_checked),
        ),
    ]
}

fn v3_stages<'a>(
    query: &'a AtomicQuery,
    signals: &'a V3Signals,
    freshness: &'a FreshnessChecker<'a>,
    identity: &'a dyn IdentityDerivation,
    oracle: &'a dyn StateOracle,
    caller: Address,
) -> Vec<Stage<'a>> {
    let v3 = &query.v3;
    vec![
        stage(
            "verifier binding",
            move || binding::check_verifier_binding(v3, signals.verifier_id),
        ),
        stage(
            "nullifier session",
            move || {
                binding::check_nullifier_session_binding(v3, signals.nullifier_session_id)
            },
        ),
        stage(
            "link group",
            move || binding::check_link_group(v3, signals.link_id),
        ),
        stage(
            "proof type",
            move || binding::check_proof_type(v3, signals.proof_type),
        ),
        stage(
            "nullifier presence",
            move || {
                binding::check_nullifier_presence(signals.nullifier, signals.nullifier_session_id)
            },
        ),
        stage(
            "identity binding",
            move || {
                binding::check_identity_binding(
                    freshness,
                    identity,
                    oracle.default_id_type(),
                    signals.is_bjj_auth_enabled,
                    signals.common.gist_root,
                    signals.common.user_id,
                    caller,
                )
            },
        ),
        stage(
            "challenge binding",
            move || binding::check_challenge_binding(signals.common.challenge, caller),
        ),
    ]
}

/// Run checks in order, stopping at the first failure.
fn run_stages(circuit: &str, stages: &[Stage<'_>]) -> Result<(), VerificationError> {
    for (stage, check) in stages {
        check()?;
        debug!(circuit, stage = *stage, "check passed");
    }
    Ok(())
}

fn rejected(circuit: &str, caller: Address, e: VerificationError) -> VerificationError {
    warn!(
        circuit,
        caller = %caller,
        kind = e.kind(),
        class = %e.class(),
        error = %e,
        "proof rejected"
    );
    e
}

fn disclosures(
    settings: &VerifierSettings,
    circuit: &CircuitBinding,
    query: &AtomicQuery,
) -> Result<Vec<DisclosurePair>, VerificationError> {
    let inputs = &circuit.inputs;
    let v3 = circuit.kind == CircuitKind::V3;
    let selective = query.operator.code() == settings.config.selective_disclosure_operator;

    let mut wanted = vec![names::USER_ID];
    if v3 {
        wanted.extend([names::LINK_ID, names::NULLIFIER]);
    }
    if selective && inputs.contains(names::OPERATOR_OUTPUT) {
        wanted.push(names::OPERATOR_OUTPUT);
    }
    wanted.push(names::TIMESTAMP);
    if v3 {
        wanted.extend([names::VERIFIER_ID, names::NULLIFIER_SESSION_ID]);
    }

    wanted
        .into_iter()
        .map(|name| pair(inputs, name))
        .collect()
}

fn pair(inputs: &NamedInputRegistry, name: &str) -> Result<DisclosurePair, VerificationError> {
    inputs.require(name).map(|index| DisclosurePair::new(name, index))
}
