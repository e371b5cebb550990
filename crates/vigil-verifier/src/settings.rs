use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use vigil_core::{CircuitKind, VerifierConfig};

use crate::error::SettingsError;
use crate::predicate::ProofPredicate;
use crate::signals::NamedInputRegistry;

/// A registered circuit: how to decode its signals and how to check its
/// proofs.
#[derive(Clone)]
pub struct CircuitBinding {
    pub kind: CircuitKind,
    pub predicate: Arc<dyn ProofPredicate>,
    pub inputs: NamedInputRegistry,
}

impl fmt::Debug for CircuitBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBinding")
            .field("kind", &self.kind)
            .field("inputs", &self.inputs.len())
            .finish_non_exhaustive()
    }
}

/// One immutable version of the verifier's administrative state.
#[derive(Debug, Clone, Default)]
pub struct VerifierSettings {
    /// Bumped by every administrative mutation.
    pub version: u64,
    pub config: VerifierConfig,
    circuits: BTreeMap<String, CircuitBinding>,
}

impl VerifierSettings {
    pub fn circuit(&self, circuit_id: &str) -> Option<&CircuitBinding> {
        self.circuits.get(circuit_id)
    }

    /// Registered circuit ids, sorted.
    pub fn circuits(&self) -> Vec<&str> {
        self.circuits.keys().map(String::as_str).collect()
    }
}

type Shared = Arc<RwLock<Arc<VerifierSettings>>>;

/// Read side of the settings. Cheap to clone; each verification takes one
/// [`SettingsHandle::snapshot`] and never sees a later mutation.
#[derive(Clone)]
pub struct SettingsHandle {
    shared: Shared,
}

impl SettingsHandle {
    /// The current settings version.
    pub fn snapshot(&self) -> Arc<VerifierSettings> {
        Arc::clone(&self.shared.read())
    }
}

/// Write side of the settings. There is exactly one; mutations take
/// `&mut self`, so they are serialized by ownership.
pub struct SettingsAdmin {
    shared: Shared,
}

impl SettingsAdmin {
    /// Start with `config` and no circuits.
    pub fn new(config: VerifierConfig) -> (Self, SettingsHandle) {
        let shared: Shared = Arc::new(RwLock::new(Arc::new(VerifierSettings {
            version: 0,
            config,
            circuits: BTreeMap::new(),
        })));
        (
            Self {
                shared: Arc::clone(&shared),
            },
            SettingsHandle { shared },
        )
    }

    pub fn handle(&self) -> SettingsHandle {
        SettingsHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn snapshot(&self) -> Arc<VerifierSettings> {
        Arc::clone(&self.shared.read())
    }

    /// Register a known circuit with its built-in signal layout.
    pub fn register_circuit(
        &mut self,
        circuit_id: &str,
        kind: CircuitKind,
        predicate: Arc<dyn ProofPredicate>,
    ) -> Result<u64, SettingsError> {
        let inputs = NamedInputRegistry::for_known_circuit(circuit_id)
            .ok_or_else(|| SettingsError::NoDefaultLayout(circuit_id.to_string()))?;
        self.register_circuit_with_inputs(circuit_id, kind, predicate, inputs)
    }

    /// Register (or replace) a circuit with an explicit signal layout.
    pub fn register_circuit_with_inputs(
        &mut self,
        circuit_id: &str,
        kind: CircuitKind,
        predicate: Arc<dyn ProofPredicate>,
        inputs: NamedInputRegistry,
    ) -> Result<u64, SettingsError> {
        if let Some(expected) = CircuitKind::of_known_circuit(circuit_id) {
            if expected != kind {
                return Err(SettingsError::KindMismatch {
                    circuit: circuit_id.to_string(),
                    expected,
                    requested: kind,
                });
            }
        }
        inputs.validate_for(circuit_id, kind)?;

        let binding = CircuitBinding {
            kind,
            predicate,
            inputs,
        };
        let version = self.update(|settings| {
            settings.circuits.insert(circuit_id.to_string(), binding);
        });
        tracing::info!(circuit = circuit_id, %kind, version, "circuit registered");
        Ok(version)
    }

    pub fn unregister_circuit(&mut self, circuit_id: &str) -> Result<u64, SettingsError> {
        if self.snapshot().circuit(circuit_id).is_none() {
            return Err(SettingsError::UnknownCircuit(circuit_id.to_string()));
        }
        let version = self.update(|settings| {
            settings.circuits.remove(circuit_id);
        });
        tracing::info!(circuit = circuit_id, version, "circuit unregistered");
        Ok(version)
    }

    /// Replace the signal layout of a registered circuit.
    pub fn set_named_inputs(
        &mut self,
        circuit_id: &str,
        inputs: NamedInputRegistry,
    ) -> Result<u64, SettingsError> {
        let kind = self
            .snapshot()
            .circuit(circuit_id)
            .map(|binding| binding.kind)
            .ok_or_else(|| SettingsError::UnknownCircuit(circuit_id.to_string()))?;
        inputs.validate_for(circuit_id, kind)?;

        let version = self.update(|settings| {
            if let Some(binding) = settings.circuits.get_mut(circuit_id) {
                binding.inputs = inputs;
            }
        });
        tracing::info!(circuit = circuit_id, version, "named inputs replaced");
        Ok(version)
    }

    pub fn set_revocation_state_expiration_timeout(&mut self, secs: u64) -> u64 {
        let version = self.update(|s| s.config.revocation_state_expiration_secs = secs);
        tracing::info!(secs, version, "revocation state expiration timeout set");
        version
    }

    pub fn set_proof_expiration_timeout(&mut self, secs: u64) -> u64 {
        let version = self.update(|s| s.config.proof_expiration_secs = secs);
        tracing::info!(secs, version, "proof expiration timeout set");
        version
    }

    pub fn set_gist_root_expiration_timeout(&mut self, secs: u64) -> u64 {
        let version = self.update(|s| s.config.gist_root_expiration_secs = secs);
        tracing::info!(secs, version, "GIST root expiration timeout set");
        version
    }

    pub fn set_selective_disclosure_operator(&mut self, code: u64) -> u64 {
        let version = self.update(|s| s.config.selective_disclosure_operator = code);
        tracing::info!(code, version, "selective disclosure operator set");
        version
    }

    /// Copy the current settings, apply `f`, and publish the result as the
    /// next version.
    fn update(&mut self, f: impl FnOnce(&mut VerifierSettings)) -> u64 {
        let mut next = VerifierSettings::clone(&self.snapshot());
        f(&mut next);
        next.version += 1;
        let version = next.version;
        *self.shared.write() = Arc::new(next);
        version
    }
}
