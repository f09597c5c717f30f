//! Error type shared by every hypergraph operation.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HypergraphError>;

#[derive(Debug, Error)]
pub enum HypergraphError {
    #[error("role-interaction matrix must be {expected}x{expected}, got {rows}x{cols}")]
    RoleMatrixShape {
        expected: usize,
        rows: usize,
        cols: usize,
    },

    #[error("only one output format may be requested, got: {requested}")]
    ConflictingFormats { requested: String },

    #[error("not implemented: {0}")]
    NotImplemented(String),

    #[error("role `{0}` is not known to this hypergraph")]
    UnknownRole(String),

    #[error("role index {index} out of range for {len} roles")]
    RoleOutOfRange { index: usize, len: usize },

    #[error("duplicate role label `{0}`")]
    DuplicateRole(String),

    #[error("invalid record #{index}: {message}")]
    InvalidRecord { index: usize, message: String },

    #[error("{path}: line {line}: {message}")]
    Csv {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl HypergraphError {
    pub(crate) fn record(index: usize, message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            index,
            message: message.into(),
        }
    }
}
