//! Workflow client error types.
//!
//! Every call against the automation service surfaces errors through
//! [`ClientError`].  Transport problems and remote rejections are kept apart
//! so the router can tell "the service said no" from "we never reached it".

/// Unified error type for the workflow client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never completed: connection failure, TLS error or timeout.
    #[error("transport error: {reason}")]
    Transport { reason: String },

    /// The service answered with a non-success status.
    #[error("remote error ({status}): {reason}")]
    Remote { status: u16, reason: String },

    /// An id-addressed call referenced a workflow or execution the service
    /// does not have.
    #[error("not found: {id}")]
    NotFound { id: String },

    /// A success response did not match the expected contract.
    #[error("failed to decode response: {reason}")]
    Decode { reason: String },

    /// The client configuration is unusable.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Whether the error means the referenced workflow no longer exists.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Remote { status, reason } => {
                *status == 404 || reason.to_lowercase().contains("not found")
            }
            _ => false,
        }
    }

    /// Whether the failure happened before the service produced a response.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

/// Convenience alias used throughout the adapters crate.
pub type Result<T> = std::result::Result<T, ClientError>;
