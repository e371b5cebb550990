//! Vigil State: read access to the identity-state ledger.
//!
//! The verifier only ever reads through [`StateOracle`]. [`InMemoryLedger`]
//! is a ledger that records state transitions and GIST roots and hands out
//! immutable [`LedgerSnapshot`]s, so that every read within one verification
//! observes the same point in time.

pub mod error;
pub mod ledger;
pub mod oracle;

pub use error::StateError;
pub use ledger::{InMemoryLedger, LedgerFile, LedgerSnapshot};
pub use oracle::{GistRootInfo, StateInfo, StateOracle};
