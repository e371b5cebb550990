//! Shared fixtures for the cross-crate verification tests.
//!
//! A [`Scenario`] is a verifier with every known circuit registered behind a
//! digest predicate, plus a ledger holding one published issuer and one GIST
//! root. [`Signals`] builds raw signal vectors by name so tests never
//! hardcode circuit offsets.

use std::collections::BTreeMap;
use std::sync::Arc;

use vigil_core::circuit::known_circuits;
use vigil_core::{Address, CircuitKind, DisclosurePair, IdType, VerifierConfig, U256};
use vigil_crypto::{address_to_le_signal, id_from_address, id_from_genesis_state, DigestKey};
use vigil_state::InMemoryLedger;
use vigil_verifier::signals::{default_layout, names};
use vigil_verifier::{
    AtomicQuery, DigestPredicate, Operator, SettingsAdmin, V3QueryFields, VerificationEngine,
    VerificationError, VerifyRequest,
};

pub use vigil_core::circuit::{
    CREDENTIAL_ATOMIC_QUERY_MTP_V2_ON_CHAIN as MTP_V2, CREDENTIAL_ATOMIC_QUERY_SIG_V2_ON_CHAIN as SIG_V2,
    CREDENTIAL_ATOMIC_QUERY_V3_ON_CHAIN as V3,
};

pub const ID_TYPE: IdType = IdType::new([0x02, 0x13]);
/// Ledger time every scenario verifies at unless a test says otherwise.
pub const NOW: u64 = 1_700_000_000;
pub const QUERY_HASH: u64 = 0x0051_4A5E;
/// When the issuer's first transition was published.
pub const ISSUER_PUBLISHED_AT: u64 = NOW - 1_000;
/// When the scenario's GIST root became current.
pub const GIST_PUBLISHED_AT: u64 = NOW - 500;

pub fn u(v: u64) -> U256 {
    U256::from(v)
}

/// Public signals keyed by name.
#[derive(Debug, Clone, Default)]
pub struct Signals {
    values: BTreeMap<&'static str, U256>,
}

impl Signals {
    pub fn set(&mut self, name: &'static str, value: U256) -> &mut Self {
        self.values.insert(name, value);
        self
    }

    pub fn with(mut self, name: &'static str, value: U256) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> U256 {
        self.values.get(name).copied().unwrap_or_default()
    }

    /// Raw vector in `circuit`'s built-in order; unset names are zero.
    pub fn layout(&self, circuit: &str) -> Vec<U256> {
        self.ordered(default_layout(circuit).unwrap_or_default())
    }

    /// Raw vector in the given name order.
    pub fn ordered<S: AsRef<str>>(&self, order: &[S]) -> Vec<U256> {
        order.iter().map(|name| self.get(name.as_ref())).collect()
    }
}

/// Verifier, ledger, and the keys needed to produce acceptable proofs.
pub struct Scenario {
    pub admin: SettingsAdmin,
    pub engine: VerificationEngine,
    pub ledger: InMemoryLedger,
    pub key: DigestKey,
    pub caller: Address,
    pub issuer: U256,
    pub issuer_genesis: U256,
    pub issuer_state: U256,
    pub gist_root: U256,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario {
    pub fn new() -> Self {
        Self::with_config(VerifierConfig::default())
    }

    pub fn with_config(config: VerifierConfig) -> Self {
        let key = DigestKey::from_bytes([0x5Au8; 32]);
        let (mut admin, handle) = SettingsAdmin::new(config);
        for circuit in known_circuits() {
            let kind = CircuitKind::of_known_circuit(circuit).unwrap_or(CircuitKind::Common);
            admin
                .register_circuit(
                    circuit,
                    kind,
                    Arc::new(DigestPredicate::new(circuit, key.clone())),
                )
                .unwrap_or_else(|e| panic!("registering {}: {}", circuit, e));
        }

        let ledger = InMemoryLedger::new(ID_TYPE);
        let issuer_genesis = u(0x1550_0000_0001);
        let issuer = id_from_genesis_state(ID_TYPE, issuer_genesis);
        let issuer_state = u(0x1550_0000_0002);
        let gist_root = u(0x6157_0000_0001);
        ledger
            .transit_state(issuer, issuer_genesis, issuer_state, ISSUER_PUBLISHED_AT)
            .unwrap_or_else(|e| panic!("publishing issuer: {}", e));
        ledger
            .publish_gist_root(gist_root, GIST_PUBLISHED_AT)
            .unwrap_or_else(|e| panic!("publishing GIST root: {}", e));

        Self {
            admin,
            engine: VerificationEngine::new(handle),
            ledger,
            key,
            caller: Address::from([0xC4u8; 20]),
            issuer,
            issuer_genesis,
            issuer_state,
            gist_root,
        }
    }

    pub fn predicate(&self, circuit: &str) -> DigestPredicate {
        DigestPredicate::new(circuit, self.key.clone())
    }

    /// The caller's address-derived identifier.
    pub fn caller_id(&self) -> U256 {
        id_from_address(ID_TYPE, self.caller)
    }

    /// Signals that pass every common check against [`Scenario::query`].
    pub fn common_signals(&self) -> Signals {
        Signals::default()
            .with(names::MERKLIZED, U256::ZERO)
            .with(names::USER_ID, self.caller_id())
            .with(names::CIRCUIT_QUERY_HASH, u(QUERY_HASH))
            .with(names::REQUEST_ID, u(1))
            .with(names::CHALLENGE, address_to_le_signal(self.caller))
            .with(names::GIST_ROOT, self.gist_root)
            .with(names::ISSUER_ID, self.issuer)
            .with(names::ISSUER_STATE, self.issuer_state)
            .with(names::IS_REVOCATION_CHECKED, u(1))
            .with(names::ISSUER_CLAIM_NON_REV_STATE, self.issuer_state)
            .with(names::TIMESTAMP, u(NOW - 10))
    }

    /// Signals that pass every V3 check against [`Scenario::query`] with
    /// direct (non-BJJ) authentication.
    pub fn v3_signals(&self) -> Signals {
        self.common_signals()
            .with(names::LINK_ID, U256::ZERO)
            .with(names::NULLIFIER, U256::ZERO)
            .with(names::OPERATOR_OUTPUT, u(42))
            .with(names::PROOF_TYPE, u(1))
            .with(names::VERIFIER_ID, U256::ZERO)
            .with(names::NULLIFIER_SESSION_ID, U256::ZERO)
            .with(names::IS_BJJ_AUTH_ENABLED, U256::ZERO)
    }

    /// Non-merklized query with no allow-list that checks revocation.
    pub fn query(circuit: &str) -> AtomicQuery {
        AtomicQuery {
            schema: u(0x5C4E_3A00),
            claim_path_key: U256::ZERO,
            operator: Operator::Lt,
            slot_index: 2,
            value: vec![u(20_020_101)],
            query_hash: u(QUERY_HASH),
            allowed_issuers: vec![],
            circuit_ids: vec![circuit.to_string()],
            skip_claim_revocation_check: false,
            claim_path_not_exists: false,
            v3: V3QueryFields::default(),
        }
    }

    /// A request whose proof is valid for `signals`.
    pub fn request(&self, circuit: &str, signals: &Signals, query: &AtomicQuery) -> VerifyRequest {
        let raw = signals.layout(circuit);
        VerifyRequest {
            proof: self.predicate(circuit).prove(&raw),
            signals: raw,
            query: query.encode(),
            caller: self.caller,
        }
    }

    pub fn verify(
        &self,
        circuit: &str,
        signals: &Signals,
        query: &AtomicQuery,
    ) -> Result<Vec<DisclosurePair>, VerificationError> {
        self.verify_at(circuit, signals, query, NOW)
    }

    pub fn verify_at(
        &self,
        circuit: &str,
        signals: &Signals,
        query: &AtomicQuery,
        now: u64,
    ) -> Result<Vec<DisclosurePair>, VerificationError> {
        let request = self.request(circuit, signals, query);
        self.engine.verify(&request, &self.ledger.snapshot(now))
    }
}

/// Names of the disclosed signals, in order.
pub fn disclosed_names(pairs: &[DisclosurePair]) -> Vec<&str> {
    pairs.iter().map(|p| p.name.as_str()).collect()
}
