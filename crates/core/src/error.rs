//! Gate error model.

use thiserror::Error;

/// Result type used for the organization-join collaborator.
pub type JoinOrgResult<T> = Result<T, JoinOrgError>;

/// Failure talking to the organization-join collaborator.
///
/// This is the only fallible operation the gate performs. It never reaches
/// the client: the gate turns every variant into a logout redirect.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JoinOrgError {
    /// The request could not be sent or the connection failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The collaborator did not answer within the configured timeout.
    #[error("timed out")]
    Timeout,

    /// The collaborator answered with a non-2xx status.
    #[error("unexpected status {0}")]
    Status(u16),

    /// The response body was not the expected JSON.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl JoinOrgError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}
