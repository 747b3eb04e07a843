//! Shared error type for malformed inputs.

use thiserror::Error;

/// Validation errors for the fundamental types.
#[derive(Debug, Error)]
pub enum TypeError {
    #[error("invalid transaction hash: {0}")]
    InvalidHash(String),

    #[error("invalid user address: {0}")]
    InvalidAddress(String),
}
