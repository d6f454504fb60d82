//! Draft submission.
//!
//! ```text
//! Idle ─submit─▶ Validating ─invalid─▶ Idle (errors returned)
//!                    │
//!                  valid
//!                    ▼
//!               Submitting ─ok──▶ Success (notice, navigate)
//!                    └──────err─▶ Failed  (notice, values kept)
//! ```
//!
//! One submission at a time: a submit arriving while another is validating
//! or in flight is rejected, not queued. Failures are reported once; a retry
//! is a new submit. A submit future dropped mid-flight leaves the pipeline
//! `Idle`.

use crate::collaborators::{Navigator, NotificationSink, RemoteStore, RouteKey, Severity};
use crate::error::SubmissionError;
use crate::store::{FormMode, FormStore};
use crate::validator::ValidationResult;
use jobdesk_model::{ConfigResult, EntityKind, EntityRecord};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Where the pipeline is in its submit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    Idle,
    Validating,
    Submitting,
    Success,
    Failed,
}

impl SubmissionState {
    pub fn is_busy(&self) -> bool {
        matches!(self, SubmissionState::Validating | SubmissionState::Submitting)
    }
}

/// What a call to [`SubmissionPipeline::submit`] ended with.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was sent.
    Invalid(ValidationResult),
    /// The remote store accepted the write and returned the stored record.
    Succeeded(EntityRecord),
    /// The remote write failed; the form still holds the user's values.
    Failed(SubmissionError),
    /// Another submission was still running.
    InProgress,
}

/// The confirmation text shown after a successful write.
pub fn success_notice(kind: EntityKind, mode: FormMode) -> &'static str {
    match (kind, mode) {
        (EntityKind::User, FormMode::Create) => "Create success!",
        (EntityKind::User, FormMode::Edit) => "Update success!",
        (EntityKind::JobPosting, FormMode::Create) => "Tạo mới thành công!",
        (EntityKind::JobPosting, FormMode::Edit) => "Cập nhật thành công!",
    }
}

/// Shown when the remote write fails.
pub fn failure_notice(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::User => "Error occurred!",
        EntityKind::JobPosting => "Có lỗi xảy ra",
    }
}

/// Held by a running submit. Dropping it while the state is still busy
/// (the submit future was cancelled) returns the pipeline to `Idle`.
struct InFlight<'a> {
    state: &'a Mutex<SubmissionState>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.is_busy() {
            warn!("Submission abandoned while {:?}", *state);
            *state = SubmissionState::Idle;
        }
    }
}

/// Validates, writes and reports one form submission at a time.
pub struct SubmissionPipeline {
    remote: Arc<dyn RemoteStore>,
    notifier: Arc<dyn NotificationSink>,
    navigator: Arc<dyn Navigator>,
    state: Mutex<SubmissionState>,
}

impl SubmissionPipeline {
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        notifier: Arc<dyn NotificationSink>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            remote,
            notifier,
            navigator,
            state: Mutex::new(SubmissionState::Idle),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, SubmissionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> SubmissionState {
        *self.lock_state()
    }

    fn set_state(&self, next: SubmissionState) {
        let mut state = self.lock_state();
        debug!("Submission state {:?} -> {:?}", *state, next);
        *state = next;
    }

    /// Moves to `Validating` unless a submission is already running.
    fn begin(&self) -> Option<InFlight<'_>> {
        let mut state = self.lock_state();
        if state.is_busy() {
            return None;
        }
        *state = SubmissionState::Validating;
        Some(InFlight { state: &self.state })
    }

    /// Submits `form`.
    ///
    /// Returns `Err` only for wiring mistakes (an edit form that lost its
    /// id). Everything the user can fix or retry comes back as a
    /// [`SubmitOutcome`].
    pub async fn submit(&self, form: &mut FormStore) -> ConfigResult<SubmitOutcome> {
        let Some(_in_flight) = self.begin() else {
            warn!("Rejected {} submit: submission in progress", form.kind());
            return Ok(SubmitOutcome::InProgress);
        };

        form.mark_submit_attempted();
        let result = form.validate_now();
        if !result.valid {
            debug!("{} form invalid: {} error(s)", form.kind(), result.errors.len());
            self.set_state(SubmissionState::Idle);
            return Ok(SubmitOutcome::Invalid(result));
        }

        let payload = form.build_payload()?;

        self.set_state(SubmissionState::Submitting);
        let kind = form.kind();
        let mode = form.mode();
        let response = match payload.id.as_deref() {
            Some(id) => self.remote.update(id, &payload).await,
            None => self.remote.create(&payload).await,
        };

        match response {
            Ok(record) => {
                info!(
                    "{} {} with {} attachment(s)",
                    kind,
                    if mode.is_edit() { "updated" } else { "created" },
                    payload.attachments.len()
                );
                self.set_state(SubmissionState::Success);
                form.commit_submitted(&record);
                self.notifier.notify(success_notice(kind, mode), Severity::Success);
                self.navigator.go_to(RouteKey::list_for(kind));
                Ok(SubmitOutcome::Succeeded(record))
            }
            Err(e) => {
                warn!("Remote write for {} failed: {}", kind, e);
                self.set_state(SubmissionState::Failed);
                self.notifier.notify(failure_notice(kind), Severity::Error);
                Ok(SubmitOutcome::Failed(SubmissionError::new(kind, mode)))
            }
        }
    }
}
