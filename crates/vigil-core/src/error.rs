/// Core type errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid signal value: {0}")]
    InvalidSignal(String),

    #[error("invalid identity type: {0}")]
    InvalidIdType(String),

    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("unknown circuit kind: {0}")]
    UnknownCircuitKind(String),
}
