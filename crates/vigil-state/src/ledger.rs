use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use vigil_core::{IdType, U256};

use crate::error::StateError;
use crate::oracle::{GistRootInfo, StateInfo, StateOracle};

/// Indexed ledger contents. Cloned only when a writer races a live snapshot.
#[derive(Debug, Clone)]
struct LedgerState {
    default_id_type: IdType,
    /// Every recorded state, keyed by state value.
    states: HashMap<U256, StateInfo>,
    /// Identity → its states in publication order; the last one is current.
    history: HashMap<U256, Vec<U256>>,
    gist_roots: HashMap<U256, GistRootInfo>,
    current_gist_root: Option<U256>,
    latest_timestamp: u64,
}

impl LedgerState {
    fn new(default_id_type: IdType) -> Self {
        Self {
            default_id_type,
            states: HashMap::new(),
            history: HashMap::new(),
            gist_roots: HashMap::new(),
            current_gist_root: None,
            latest_timestamp: 0,
        }
    }

    fn check_clock(&self, at: u64) -> Result<(), StateError> {
        if at < self.latest_timestamp {
            return Err(StateError::NonMonotonicTimestamp {
                at,
                latest: self.latest_timestamp,
            });
        }
        Ok(())
    }

    fn current_state(&self, id: U256) -> Option<&StateInfo> {
        self.history
            .get(&id)
            .and_then(|states| states.last())
            .and_then(|state| self.states.get(state))
    }
}

/// On-disk form of a ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerFile {
    /// Identity type for address-derived identifiers.
    pub default_id_type: IdType,
    /// All recorded states, in publication order per identity.
    #[serde(default)]
    pub states: Vec<StateInfo>,
    /// All recorded GIST roots, in publication order.
    #[serde(default)]
    pub gist_roots: Vec<GistRootInfo>,
}

/// In-memory identity-state ledger.
///
/// Writers are serialized by the lock; readers take a [`LedgerSnapshot`],
/// which shares the current contents and is unaffected by later writes.
pub struct InMemoryLedger {
    inner: RwLock<Arc<LedgerState>>,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    pub fn new(default_id_type: IdType) -> Self {
        Self {
            inner: RwLock::new(Arc::new(LedgerState::new(default_id_type))),
        }
    }

    /// Record a state transition for `id` at time `at`.
    ///
    /// The first transition of an identity also records `old_state` as its
    /// genesis state, superseded at `at`. Later transitions must start from
    /// the identity's current state.
    pub fn transit_state(
        &self,
        id: U256,
        old_state: U256,
        new_state: U256,
        at: u64,
    ) -> Result<(), StateError> {
        let mut guard = self.inner.write();
        let ledger = Arc::make_mut(&mut guard);

        if old_state == new_state || ledger.states.contains_key(&new_state) {
            return Err(StateError::StateAlreadyExists(new_state));
        }
        ledger.check_clock(at)?;

        match ledger.current_state(id).map(|info| info.state) {
            Some(current) if current != old_state => {
                return Err(StateError::StateMismatch {
                    id,
                    current,
                    claimed: old_state,
                });
            }
            Some(_) => {}
            None => {
                if ledger.states.contains_key(&old_state) {
                    return Err(StateError::StateAlreadyExists(old_state));
                }
                ledger.states.insert(
                    old_state,
                    StateInfo {
                        id,
                        state: old_state,
                        created_at: 0,
                        superseded_at: None,
                    },
                );
                ledger.history.insert(id, vec![old_state]);
            }
        }

        if let Some(previous) = ledger.states.get_mut(&old_state) {
            previous.superseded_at = Some(at);
        }
        ledger.states.insert(
            new_state,
            StateInfo {
                id,
                state: new_state,
                created_at: at,
                superseded_at: None,
            },
        );
        ledger.history.entry(id).or_default().push(new_state);
        ledger.latest_timestamp = at;

        tracing::debug!(
            id = %format_args!("{:#x}", id),
            state = %format_args!("{:#x}", new_state),
            at,
            "state transition recorded"
        );
        Ok(())
    }

    /// Make `root` the current GIST root as of `at`.
    pub fn publish_gist_root(&self, root: U256, at: u64) -> Result<(), StateError> {
        let mut guard = self.inner.write();
        let ledger = Arc::make_mut(&mut guard);

        if ledger.gist_roots.contains_key(&root) {
            return Err(StateError::GistRootAlreadyExists(root));
        }
        ledger.check_clock(at)?;

        if let Some(previous) = ledger.current_gist_root {
            if let Some(info) = ledger.gist_roots.get_mut(&previous) {
                info.superseded_at = Some(at);
            }
        }
        ledger.gist_roots.insert(
            root,
            GistRootInfo {
                root,
                created_at: at,
                superseded_at: None,
            },
        );
        ledger.current_gist_root = Some(root);
        ledger.latest_timestamp = at;

        tracing::debug!(root = %format_args!("{:#x}", root), at, "GIST root published");
        Ok(())
    }

    /// A consistent read-only view of the ledger at ledger time `now`.
    pub fn snapshot(&self, now: u64) -> LedgerSnapshot {
        LedgerSnapshot {
            state: Arc::clone(&self.inner.read()),
            timestamp: now,
        }
    }

    /// Identity type used for address-derived identifiers.
    pub fn default_id_type(&self) -> IdType {
        self.inner.read().default_id_type
    }

    /// Number of recorded states, genesis states included.
    pub fn state_count(&self) -> usize {
        self.inner.read().states.len()
    }

    /// Number of recorded GIST roots.
    pub fn gist_root_count(&self) -> usize {
        self.inner.read().gist_roots.len()
    }

    /// Export the ledger in its on-disk form.
    pub fn to_file(&self) -> LedgerFile {
        let ledger = Arc::clone(&self.inner.read());

        let mut ids: Vec<&U256> = ledger.history.keys().collect();
        ids.sort();
        let states = ids
            .into_iter()
            .flat_map(|id| ledger.history[id].iter())
            .filter_map(|state| ledger.states.get(state).cloned())
            .collect();

        let mut gist_roots: Vec<GistRootInfo> = ledger.gist_roots.values().cloned().collect();
        gist_roots.sort_by_key(|info| (info.created_at, info.superseded_at.is_none()));

        LedgerFile {
            default_id_type: ledger.default_id_type,
            states,
            gist_roots,
        }
    }

    /// Rebuild a ledger from its on-disk form.
    pub fn from_file(file: LedgerFile) -> Result<Self, StateError> {
        let mut ledger = LedgerState::new(file.default_id_type);
        let mut current: HashMap<U256, U256> = HashMap::new();

        for info in file.states {
            if ledger.states.contains_key(&info.state) {
                return Err(StateError::StateAlreadyExists(info.state));
            }
            if info.superseded_at.is_none() {
                if let Some(first) = current.insert(info.id, info.state) {
                    return Err(StateError::MultipleCurrentStates {
                        id: info.id,
                        first,
                        second: info.state,
                    });
                }
            }
            ledger.latest_timestamp = ledger
                .latest_timestamp
                .max(info.created_at)
                .max(info.superseded_at.unwrap_or(0));
            ledger.history.entry(info.id).or_default().push(info.state);
            ledger.states.insert(info.state, info);
        }

        for info in file.gist_roots {
            if ledger.gist_roots.contains_key(&info.root) {
                return Err(StateError::GistRootAlreadyExists(info.root));
            }
            ledger.latest_timestamp = ledger.latest_timestamp.max(info.created_at);
            if info.is_current() {
                if let Some(first) = ledger.current_gist_root {
                    return Err(StateError::MultipleCurrentGistRoots {
                        first,
                        second: info.root,
                    });
                }
                ledger.current_gist_root = Some(info.root);
            }
            ledger.gist_roots.insert(info.root, info);
        }

        Ok(Self {
            inner: RwLock::new(Arc::new(ledger)),
        })
    }

    /// Load a ledger from a JSON file.
    pub fn load(path: &Path) -> Result<Self, StateError> {
        let contents = std::fs::read_to_string(path)?;
        let file: LedgerFile = serde_json::from_str(&contents)?;
        let ledger = Self::from_file(file)?;
        tracing::info!(
            path = %path.display(),
            states = ledger.state_count(),
            gist_roots = ledger.gist_root_count(),
            "ledger loaded"
        );
        Ok(ledger)
    }

    /// Save the ledger as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), StateError> {
        let contents = serde_json::to_string_pretty(&self.to_file())?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Immutable view of an [`InMemoryLedger`] at one ledger time.
#[derive(Debug, Clone)]
pub struct LedgerSnapshot {
    state: Arc<LedgerState>,
    timestamp: u64,
}

impl StateOracle for LedgerSnapshot {
    fn timestamp(&self) -> u64 {
        self.timestamp
    }

    fn gist_root_info(&self, root: U256) -> Option<GistRootInfo> {
        self.state.gist_roots.get(&root).cloned()
    }

    fn state_info_by_id(&self, id: U256) -> Option<StateInfo> {
        self.state.current_state(id).cloned()
    }

    fn state_info_by_id_and_state(&self, _id: U256, state: U256) -> Option<StateInfo> {
        self.state.states.get(&state).cloned()
    }

    fn id_exists(&self, id: U256) -> bool {
        self.state.history.contains_key(&id)
    }

    fn default_id_type(&self) -> IdType {
        self.state.default_id_type
    }
}
