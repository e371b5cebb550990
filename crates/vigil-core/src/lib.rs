//! Vigil Core: Fundamental types, errors, and configuration shared by every
//! layer of the Vigil credential-proof verifier.

pub mod circuit;
pub mod config;
pub mod error;
pub mod types;

pub use circuit::CircuitKind;
pub use config::VerifierConfig;
pub use error::CoreError;
pub use types::{parse_signal, Address, DisclosurePair, IdType, Signal, U256};
