//! Errors raised by the solvers, reductions and text codecs.
//!
//! An unsatisfiable formula or an infeasible subset-sum instance is not an
//! error: those are ordinary results of a solve call.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Structurally malformed or out-of-range instance data.
    #[error("invalid instance: {0}")]
    InvalidInstance(String),

    /// Text that could not be decoded into an instance.
    #[error("parse error at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    /// A dynamic programming table too large to allocate.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// A search stopped by its [`crate::Budget`] before reaching an answer.
    #[error("search interrupted after {nodes} nodes")]
    Interrupted { nodes: u64 },
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Error {
        Error::InvalidInstance(message.into())
    }

    pub(crate) fn parse(line: usize, column: usize, message: impl Into<String>) -> Error {
        Error::Parse {
            line,
            column,
            message: message.into(),
        }
    }
}
