//! Form engine for the JobDesk admin dashboard.
//!
//! The pieces, leaves first:
//! - [`validator`]: derives the effective rule set for the current values
//!   (base rules plus the branch picked by the discriminator) and validates
//!   a record against it, returning errors as data
//! - [`staging`]: files picked by the user, each with a revocable preview
//! - [`store`]: field values, dirty/touched flags, branch quarantine on
//!   discriminator changes, and the staged attachments per file field
//! - [`payload`]: maps a valid form into what the remote store receives
//! - [`pipeline`]: the submit state machine, talking to the injected
//!   [`RemoteStore`], [`NotificationSink`] and [`Navigator`]
//!
//! Everything runs on the caller's task. The only suspension point is the
//! remote write inside [`SubmissionPipeline::submit`].

mod collaborators;
mod error;
pub mod payload;
pub mod pipeline;
pub mod staging;
pub mod store;
pub mod validator;

pub use collaborators::{Navigator, NotificationSink, RemoteStore, RouteKey, Severity};
pub use error::{
    RejectedFile, RemoteError, RemoteResult, ResourceLeakWarning, SubmissionError,
};
pub use payload::{AttachmentUpload, SubmissionPayload};
pub use pipeline::{
    SubmissionPipeline, SubmissionState, SubmitOutcome, failure_notice, success_notice,
};
pub use staging::{
    AttachmentStaging, FileKey, LocalFile, PreviewHandle, PreviewRegistry, PreviewSource,
    StagedAttachment,
};
pub use store::{FormMode, FormStore};
pub use validator::{
    EffectiveSchema, FieldErrors, ValidationResult, derive_effective_schema, validate,
};
