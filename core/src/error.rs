//! Error types for the OCS client.
//!
//! # Design
//! There are exactly three ways a call fails locally: the request never
//! produced a response, the response was not XML, or the input was rejected
//! before anything was sent. Every variant names the [`Operation`] that
//! failed. A remote refusal ("user already exists") is not an error here;
//! it comes back as `Ok(Ocs)` with a failure status code in [`Meta`].
//!
//! [`Meta`]: crate::Meta

use thiserror::Error;

use crate::transport::BoxError;
use crate::types::Operation;

/// Result alias used throughout the client.
pub type OcsResult<T> = Result<T, OcsError>;

/// Errors returned by `OcsClient` operations.
#[derive(Debug, Error)]
pub enum OcsError {
    /// Building, sending or reading the HTTP exchange failed (includes the
    /// 10 second timeout).
    #[error("{operation}: transport failed: {source}")]
    Transport {
        operation: Operation,
        #[source]
        source: BoxError,
    },

    /// The response body is not a well-formed `<ocs>` document.
    #[error("{operation}: could not decode response: {source}")]
    Decode {
        operation: Operation,
        #[source]
        source: quick_xml::DeError,
    },

    /// Input was rejected before any request was sent.
    #[error("{operation}: {message}")]
    Validation {
        operation: Operation,
        message: String,
    },
}

impl OcsError {
    /// The operation that produced this error.
    pub fn operation(&self) -> Operation {
        match self {
            OcsError::Transport { operation, .. }
            | OcsError::Decode { operation, .. }
            | OcsError::Validation { operation, .. } => *operation,
        }
    }

    pub(crate) fn validation(operation: Operation, message: impl Into<String>) -> Self {
        OcsError::Validation {
            operation,
            message: message.into(),
        }
    }
}
