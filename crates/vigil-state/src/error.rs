use vigil_core::U256;

/// Ledger mutation and persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("state mismatch for identity {id:#x}: current {current:#x}, transition claims {claimed:#x}")]
    StateMismatch { id: U256, current: U256, claimed: U256 },

    #[error("state {0:#x} is already recorded")]
    StateAlreadyExists(U256),

    #[error("GIST root {0:#x} is already recorded")]
    GistRootAlreadyExists(U256),

    #[error("identity {id:#x} has more than one current state: {first:#x} and {second:#x}")]
    MultipleCurrentStates { id: U256, first: U256, second: U256 },

    #[error("more than one current GIST root: {first:#x} and {second:#x}")]
    MultipleCurrentGistRoots { first: U256, second: U256 },

    #[error("timestamp {at} precedes the latest recorded timestamp {latest}")]
    NonMonotonicTimestamp { at: u64, latest: u64 },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
