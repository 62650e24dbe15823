use thiserror::Error;

#[derive(Error, Debug)]
pub enum AllowlistError {
    #[error("Invalid address '{input}': {reason}")]
    InvalidAddress { input: String, reason: String },
    #[error("Invalid amount '{input}': {reason}")]
    InvalidAmount { input: String, reason: String },
    #[error("No valid recipients to build from")]
    EmptyInput,
    #[error("Proof length mismatch: expected at most {expected} siblings, got {actual}")]
    ProofLengthMismatch { expected: usize, actual: usize },
    #[error("Invalid 32-byte hash: '{input}'")]
    InvalidHash { input: String },
    #[error("Leaf index {index} is out of bounds for tree with {leaf_count} leaves")]
    IndexOutOfRange { index: usize, leaf_count: usize },
    #[error("Self-check failed: proof for leaf {index} does not reach the root")]
    SelfCheckFailed { index: usize },
    #[error("io Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serde Error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl AllowlistError {
    pub(crate) fn invalid_address(input: &str, reason: impl Into<String>) -> Self {
        AllowlistError::InvalidAddress {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_amount(input: &str, reason: impl Into<String>) -> Self {
        AllowlistError::InvalidAmount {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AllowlistError>;
