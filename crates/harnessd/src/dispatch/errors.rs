//! Error types for request dispatch failures.
//!
//! Operation failures are reported in-band as `success: false` with the
//! error's display text, so the messages below are part of the protocol.
//! Clients match on the leading phrase (`Method not found`, `Context not
//! found`, ...) to tell failure kinds apart.

use std::io;

use thiserror::Error;

use crate::session::SessionError;
use crate::value::DecodeError;

/// Errors surfaced during request parsing and dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No method is registered under the requested name.
    #[error("Method not found: {name}")]
    MethodNotFound {
        /// Requested method name.
        name: String,
    },

    /// The `arguments` text is not a JSON object.
    #[error("Invalid JSON arguments: {source}")]
    InvalidArguments {
        /// Decoder failure.
        #[source]
        source: DecodeError,
    },

    /// The supplied `context_id` does not resolve to a live context.
    #[error("Context not found: {id}")]
    ContextNotFound {
        /// Requested context id.
        id: String,
    },

    /// A stateful method was invoked without a context while sessions are
    /// strict.
    #[error("Method {name} requires a context")]
    SessionRequired {
        /// Requested method name.
        name: String,
    },

    /// The callable itself failed.
    #[error("{message}")]
    CallableFailure {
        /// Message raised by the callable.
        message: String,
    },

    /// The request line is not a valid request.
    #[error("malformed request: {message}")]
    MalformedRequest {
        /// Parser message.
        message: String,
    },

    /// The request line exceeds the size limit.
    #[error("request too large: exceeds {max_size} byte limit")]
    RequestTooLarge {
        /// Size limit in bytes.
        max_size: usize,
    },

    /// IO error during read or write.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Response serialization failed.
    #[error("failed to serialize response: {0}")]
    SerializeResponse(#[from] serde_json::Error),
}

impl DispatchError {
    /// Creates a method-not-found error.
    pub fn method_not_found(name: impl Into<String>) -> Self {
        Self::MethodNotFound { name: name.into() }
    }

    /// Creates a session-required error.
    pub fn session_required(name: impl Into<String>) -> Self {
        Self::SessionRequired { name: name.into() }
    }

    /// Creates a callable failure carrying `message` verbatim.
    pub fn callable_failure(message: impl Into<String>) -> Self {
        Self::CallableFailure {
            message: message.into(),
        }
    }

    /// Creates a malformed request error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRequest {
            message: message.into(),
        }
    }

    /// Creates a request too large error.
    #[must_use]
    pub const fn request_too_large(max_size: usize) -> Self {
        Self::RequestTooLarge { max_size }
    }
}

impl From<DecodeError> for DispatchError {
    fn from(source: DecodeError) -> Self {
        Self::InvalidArguments { source }
    }
}

impl From<SessionError> for DispatchError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::NotFound { id } => Self::ContextNotFound { id },
        }
    }
}
