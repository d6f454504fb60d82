//! Error types for the form engine.
//!
//! Field-level validation failures are not errors here: they travel as data
//! in [`ValidationResult`](crate::ValidationResult).

use crate::FormMode;
use jobdesk_model::EntityKind;
use thiserror::Error;

/// Result type for remote store operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Failures reported by a [`RemoteStore`](crate::RemoteStore) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// Could not reach the store (connect, timeout, TLS).
    #[error("transport error: {0}")]
    Transport(String),

    /// The store answered with a failure status.
    #[error("rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The record addressed by the operation does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The response could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),
}

/// A remote write failed. Uniform across transports; the form keeps its data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not {action} {kind}")]
pub struct SubmissionError {
    pub kind: EntityKind,
    pub action: &'static str,
}

impl SubmissionError {
    pub fn new(kind: EntityKind, mode: FormMode) -> Self {
        let action = match mode {
            FormMode::Create => "create",
            FormMode::Edit => "update",
        };
        Self { kind, action }
    }
}

/// A picked file turned away by its field's upload limits. Nothing was
/// staged for it and no preview was created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectedFile {
    #[error("{name} is {size} bytes, over the {max} byte limit")]
    TooLarge { name: String, size: u64, max: u64 },

    #[error("{name} is {mime_type}, which this field does not accept")]
    UnsupportedType { name: String, mime_type: String },

    #[error("{name} would exceed the limit of {max} file(s)")]
    TooMany { name: String, max: usize },
}

impl RejectedFile {
    pub fn file_name(&self) -> &str {
        match self {
            RejectedFile::TooLarge { name, .. }
            | RejectedFile::UnsupportedType { name, .. }
            | RejectedFile::TooMany { name, .. } => name,
        }
    }
}

/// Preview resources that were created but never released.
///
/// A defect to catch in tests, not a runtime-recoverable condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{live} preview resource(s) never released")]
pub struct ResourceLeakWarning {
    pub live: usize,
}
