//! Callable shapes and the argument bag handed to them.
//!
//! A method is either *stateless*, receiving only its named arguments, or
//! *stateful*, additionally receiving the [`Session`] it is bound to. The
//! shape is fixed at registration time; the dispatcher never inspects a
//! callable to decide how to call it.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::session::Session;

/// Result type returned by every callable.
pub type MethodResult = Result<Value, CallError>;

/// Signature of a stateless callable.
pub type StatelessFn = dyn Fn(&Arguments) -> MethodResult + Send + Sync;

/// Signature of a stateful callable.
pub type StatefulFn = dyn Fn(&Session, &Arguments) -> MethodResult + Send + Sync;

/// Failure raised by a callable. The message is forwarded to the caller
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CallError {
    message: String,
}

impl CallError {
    /// Builds an error carrying `message`.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message reported to the caller.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&str> for CallError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for CallError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// Named arguments decoded from an invocation request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: Map<String, Value>,
}

impl Arguments {
    /// Wraps a decoded JSON object.
    #[must_use]
    pub const fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Returns the named argument, if supplied.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Returns the named argument or fails with a caller-facing message.
    ///
    /// # Errors
    ///
    /// Returns [`CallError`] when the argument is absent.
    pub fn require(&self, name: &str) -> Result<&Value, CallError> {
        self.get(name)
            .ok_or_else(|| CallError::new(format!("Missing argument '{name}'")))
    }

    /// Returns the named argument as a signed integer.
    ///
    /// # Errors
    ///
    /// Returns [`CallError`] when the argument is absent or not an integer.
    pub fn require_i64(&self, name: &str) -> Result<i64, CallError> {
        self.get(name)
            .and_then(Value::as_i64)
            .ok_or_else(|| CallError::new(format!("Missing or invalid '{name}'")))
    }

    /// Number of supplied arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no arguments were supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Consumes the bag, returning the underlying JSON object.
    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.values
    }
}

impl From<Map<String, Value>> for Arguments {
    fn from(values: Map<String, Value>) -> Self {
        Self::new(values)
    }
}

/// Executable behaviour of a registered method.
#[derive(Clone)]
pub enum Callable {
    /// Called with the arguments only.
    Stateless(Arc<StatelessFn>),
    /// Called with a session and the arguments.
    Stateful(Arc<StatefulFn>),
}

impl Callable {
    /// Wraps a stateless closure.
    pub fn stateless<F>(function: F) -> Self
    where
        F: Fn(&Arguments) -> MethodResult + Send + Sync + 'static,
    {
        Self::Stateless(Arc::new(function))
    }

    /// Wraps a stateful closure.
    pub fn stateful<F>(function: F) -> Self
    where
        F: Fn(&Session, &Arguments) -> MethodResult + Send + Sync + 'static,
    {
        Self::Stateful(Arc::new(function))
    }

    /// Whether the callable expects a session.
    #[must_use]
    pub const fn is_stateful(&self) -> bool {
        matches!(self, Self::Stateful(_))
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stateless(_) => formatter.write_str("Callable::Stateless"),
            Self::Stateful(_) => formatter.write_str("Callable::Stateful"),
        }
    }
}
