//! Core form model for the JobDesk admin dashboard.
//!
//! Defines the types every form subsystem depends on:
//! - [`EntityRecord`]: the dot-addressable JSON record a form edits
//! - [`FileRef`]: the record-level stand-in for a staged file
//! - [`FieldRule`] / [`ConditionalRuleSet`]: what a field must satisfy, and
//!   which rules depend on a discriminator value (e.g., the user's role)
//! - [`SchemaRegistry`]: the static rule declarations per [`EntityKind`]
//!
//! These types are consumed by the validator, the form store and the
//! submission pipeline in `jobdesk-forms`, and (as JSON) by the REST client.

mod builtin;
mod error;
mod record;
mod registry;
mod schema;

pub use builtin::{
    AVATAR_MAX_BYTES, AVATAR_TYPES, JOB_POSTING_MAX_IMAGES, job_posting_schema, user_schema,
};
pub use error::{ConfigResult, ConfigurationError};
pub use record::{EntityRecord, FileRef, is_blank};
pub use registry::SchemaRegistry;
pub use schema::{
    ConditionalBranch, ConditionalRuleSet, EntityKind, EntitySchema, FieldRule, RuleType,
    UploadLimits,
};
