use serde::{Deserialize, Serialize};
use vigil_core::{IdType, U256};

/// What the ledger knows about a GIST root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GistRootInfo {
    /// The root itself.
    pub root: U256,
    /// When the root became current (unix seconds).
    pub created_at: u64,
    /// When a newer root replaced it; `None` while it is current.
    pub superseded_at: Option<u64>,
}

impl GistRootInfo {
    /// Whether this is the ledger's current root.
    pub fn is_current(&self) -> bool {
        self.superseded_at.is_none()
    }
}

/// One recorded identity state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateInfo {
    /// Identity that owns the state.
    pub id: U256,
    /// The state value.
    pub state: U256,
    /// When the state was published (unix seconds); 0 for genesis states.
    pub created_at: u64,
    /// When a later transition replaced it; `None` while it is current.
    pub superseded_at: Option<u64>,
}

/// Read-only view of the identity-state ledger.
///
/// Implementations must answer every call from one consistent point in time,
/// including [`StateOracle::timestamp`]: the verifier's expiration arithmetic
/// mixes `timestamp()` with supersession times read in the same call.
pub trait StateOracle: Send + Sync {
    /// The ledger time of this view (unix seconds).
    fn timestamp(&self) -> u64;

    /// Record for a GIST root, if it was ever current.
    fn gist_root_info(&self, root: U256) -> Option<GistRootInfo>;

    /// Current state record of an identity.
    fn state_info_by_id(&self, id: U256) -> Option<StateInfo>;

    /// Record for a state value. The returned `id` is the identity that owns
    /// the state, which callers must compare against the identity they asked
    /// about.
    fn state_info_by_id_and_state(&self, id: U256, state: U256) -> Option<StateInfo>;

    /// Whether the identity has any recorded transition.
    fn id_exists(&self, id: U256) -> bool;

    /// Identity type used for identifiers derived from addresses.
    fn default_id_type(&self) -> IdType;
}
