//! Service configuration loading and management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use vigil_core::circuit::known_circuits;
use vigil_core::{CircuitKind, IdType, VerifierConfig};
use vigil_crypto::DigestKey;
use vigil_state::InMemoryLedger;
use vigil_verifier::{DigestPredicate, NamedInputRegistry, SettingsAdmin, SettingsHandle};

/// Full configuration for the Vigil service.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VigilConfig {
    /// API server settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Identity-state ledger settings.
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Timeouts and the selective-disclosure operator.
    #[serde(default)]
    pub verifier: VerifierConfig,

    /// Circuits accepted by the verifier.
    #[serde(default)]
    pub circuits: Vec<CircuitConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API listen address.
    #[serde(default = "default_api_addr")]
    pub listen_addr: String,
    /// API port.
    #[serde(default = "default_api_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// JSON ledger snapshot to load at startup. An empty ledger is used
    /// when unset or missing.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
    /// Identity type of address-derived identifiers, as 4 hex digits.
    #[serde(default = "default_id_type")]
    pub default_id_type: IdType,
}

/// One registered circuit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitConfig {
    /// Circuit identifier as it appears in queries.
    pub id: String,
    pub kind: CircuitKind,
    /// Key of the digest proof predicate, 64 hex digits.
    pub verifying_key: DigestKey,
    /// Signal names in order, overriding the built-in layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<String>>,
}

// Default value functions
fn default_api_addr() -> String {
    "127.0.0.1".into()
}
fn default_api_port() -> u16 {
    9101
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}
fn default_id_type() -> IdType {
    IdType::new([0x02, 0x13])
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_api_addr(),
            port: default_api_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            default_id_type: default_id_type(),
        }
    }
}

impl LedgerConfig {
    /// Open the configured ledger, or an empty one when no snapshot exists.
    ///
    /// A loaded snapshot keeps its own identity type; `default_id_type`
    /// only applies to a fresh ledger.
    pub fn open(&self) -> anyhow::Result<InMemoryLedger> {
        let path = match &self.snapshot_path {
            Some(path) if path.exists() => path,
            Some(path) => {
                tracing::warn!(path = %path.display(), "ledger snapshot not found, starting empty");
                return Ok(InMemoryLedger::new(self.default_id_type));
            }
            None => return Ok(InMemoryLedger::new(self.default_id_type)),
        };
        let ledger = InMemoryLedger::load(path)?;
        if ledger.default_id_type() != self.default_id_type {
            tracing::warn!(
                path = %path.display(),
                snapshot = %ledger.default_id_type(),
                configured = %self.default_id_type,
                "ledger snapshot id type differs from config; using the snapshot's"
            );
        }
        Ok(ledger)
    }
}

impl VigilConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: VigilConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Default config with every known circuit and fresh verifying keys.
    pub fn generate() -> Self {
        let circuits = known_circuits()
            .into_iter()
            .filter_map(|id| {
                CircuitKind::of_known_circuit(id).map(|kind| CircuitConfig {
                    id: id.to_string(),
                    kind,
                    verifying_key: DigestKey::generate(),
                    inputs: None,
                })
            })
            .collect();
        Self {
            circuits,
            ..Self::default()
        }
    }

    /// API listen address as `host:port`.
    pub fn api_addr(&self) -> String {
        format!("{}:{}", self.api.listen_addr, self.api.port)
    }

    /// Build the verifier settings this config describes.
    pub fn build_settings(&self) -> anyhow::Result<(SettingsAdmin, SettingsHandle)> {
        let (mut admin, handle) = SettingsAdmin::new(self.verifier.clone());
        for circuit in &self.circuits {
            let predicate = Arc::new(DigestPredicate::new(
                circuit.id.clone(),
                circuit.verifying_key.clone(),
            ));
            match &circuit.inputs {
                Some(names) => {
                    let inputs = NamedInputRegistry::from_names(names)?;
                    admin.register_circuit_with_inputs(&circuit.id, circuit.kind, predicate, inputs)?
                }
                None => admin.register_circuit(&circuit.id, circuit.kind, predicate)?,
            };
        }
        Ok((admin, handle))
    }
}
