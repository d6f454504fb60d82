//! Error types for schema lookups.

use crate::EntityKind;
use thiserror::Error;

/// Result type for registry and schema operations.
pub type ConfigResult<T> = Result<T, ConfigurationError>;

/// Programmer errors: the form was wired to something that does not exist.
///
/// These are never user-recoverable and must not be swallowed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// No schema is registered (or known) under this entity kind.
    #[error("unknown entity kind: {0}")]
    UnknownEntityKind(String),

    /// An edit form was opened on a record without an `id`.
    #[error("{0} record opened for editing has no id")]
    MissingIdentity(EntityKind),

    /// A field that is read-only in this form mode was written.
    #[error("{field} of a {kind} record cannot change while editing")]
    LockedField { kind: EntityKind, field: String },
}
