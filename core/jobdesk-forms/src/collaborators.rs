//! Interfaces the form engine talks through.
//!
//! The pipeline never reaches for globals; the remote store, the notice
//! sink and navigation are handed in at construction.

use crate::error::RemoteResult;
use crate::payload::SubmissionPayload;
use async_trait::async_trait;
use jobdesk_model::{EntityKind, EntityRecord};
use serde::{Deserialize, Serialize};

/// The REST backend holding users and job postings.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Loads one record. `Ok(None)` when the id does not exist.
    async fn fetch_by_id(&self, kind: EntityKind, id: &str) -> RemoteResult<Option<EntityRecord>>;

    /// Creates a record from a submission payload.
    async fn create(&self, payload: &SubmissionPayload) -> RemoteResult<EntityRecord>;

    /// Replaces the record `id` with a submission payload.
    async fn update(&self, id: &str, payload: &SubmissionPayload) -> RemoteResult<EntityRecord>;

    /// Deletes a record.
    async fn delete(&self, kind: EntityKind, id: &str) -> RemoteResult<()>;
}

/// How prominent a notice is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

/// Fire-and-forget user notices (snackbars, console lines).
pub trait NotificationSink: Send + Sync {
    fn notify(&self, message: &str, severity: Severity);
}

/// Where the dashboard can be sent after a successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKey {
    UserList,
    JobPostingList,
}

impl RouteKey {
    /// The list page for an entity kind.
    pub fn list_for(kind: EntityKind) -> Self {
        match kind {
            EntityKind::User => RouteKey::UserList,
            EntityKind::JobPosting => RouteKey::JobPostingList,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            RouteKey::UserList => "/dashboard/user/list",
            RouteKey::JobPostingList => "/dashboard/e-commerce/list",
        }
    }
}

/// Moves the user to another page.
pub trait Navigator: Send + Sync {
    fn go_to(&self, route: RouteKey);
}
