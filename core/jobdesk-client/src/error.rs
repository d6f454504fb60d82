//! Admin API client error types.

use jobdesk_forms::RemoteError;
use thiserror::Error;

/// Result type for admin API calls.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while talking to the admin API.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response has no `data` envelope")]
    MissingData,

    #[error("unexpected response shape: {0}")]
    Shape(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// HTTP status of the failed response, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<ClientError> for RemoteError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Status { status: 404, body } => RemoteError::NotFound(body),
            ClientError::Status { status, body } => RemoteError::Rejected {
                status,
                message: body,
            },
            ClientError::Http(e) if e.is_decode() => RemoteError::Decode(e.to_string()),
            ClientError::Http(e) => RemoteError::Transport(e.to_string()),
            ClientError::Serialization(e) => RemoteError::Decode(e.to_string()),
            e @ (ClientError::MissingData | ClientError::Shape(_)) => {
                RemoteError::Decode(e.to_string())
            }
            ClientError::Config(msg) => RemoteError::Transport(msg),
        }
    }
}
