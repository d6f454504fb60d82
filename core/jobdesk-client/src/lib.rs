//! HTTP client for the JobDesk admin API.
//!
//! [`AdminApiClient`] talks to the REST backend behind the dashboard and
//! implements [`RemoteStore`](jobdesk_forms::RemoteStore), so a
//! [`SubmissionPipeline`](jobdesk_forms::SubmissionPipeline) can write
//! through it directly.

pub mod api;
pub mod config;
pub mod error;

pub use api::AdminApiClient;
pub use config::ApiConfig;
pub use error::{ClientError, ClientResult};
