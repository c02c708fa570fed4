//! Error definitions for block operations.

use std::time::Duration;
use thiserror::Error;

use crate::blocks::validator::SyntaxErrors;

/// Errors reported by a block store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The instance is not known to the store.
    #[error("rpaas instance \"{0}\" not found")]
    InstanceNotFound(String),

    /// No block is stored under the requested key.
    #[error("block \"{name}\" not found")]
    BlockNotFound { name: String },

    /// The store refused the block.
    #[error("invalid block: {0}")]
    InvalidBlock(String),

    /// The backing storage could not serve the request.
    #[error("block store unavailable: {0}")]
    Unavailable(String),
}

/// Errors returned by block service operations.
#[derive(Debug, Error)]
pub enum BlockError {
    #[error("Request body can't be empty")]
    EmptyBody,

    /// Request body or form could not be decoded.
    #[error("{0}")]
    MalformedRequest(String),

    /// A required form field was not sent.
    #[error("missing required field \"{0}\"")]
    MissingField(&'static str),

    /// Content rejected by the syntax validator.
    #[error(transparent)]
    InvalidSyntax(#[from] SyntaxErrors),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The store call did not finish within the operation deadline.
    #[error("block store did not respond within {0:?}")]
    Timeout(Duration),
}

impl BlockError {
    /// Whether the failure was caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            BlockError::EmptyBody
                | BlockError::MalformedRequest(_)
                | BlockError::MissingField(_)
                | BlockError::InvalidSyntax(_)
                | BlockError::Store(StoreError::InvalidBlock(_))
        )
    }
}

/// Result type for block operations.
pub type BlockResult<T> = Result<T, BlockError>;
