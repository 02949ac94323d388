//! Declarative method lists handed to the registry in one call.

use super::callable::{Arguments, Callable, MethodResult};
use super::MethodMetadata;
use crate::session::Session;

/// A single method declaration.
#[derive(Debug, Clone)]
pub struct MethodEntry {
    /// Registered name.
    pub name: String,
    /// Executable behaviour.
    pub callable: Callable,
    /// Descriptive metadata.
    pub metadata: MethodMetadata,
}

/// Ordered collection of method declarations.
///
/// Entries keep their declaration order, which becomes the listing order
/// once registered.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    entries: Vec<MethodEntry>,
}

impl Manifest {
    /// Creates an empty manifest.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Declares a stateless method.
    #[must_use]
    pub fn stateless<F>(self, name: &str, metadata: MethodMetadata, function: F) -> Self
    where
        F: Fn(&Arguments) -> MethodResult + Send + Sync + 'static,
    {
        self.push(MethodEntry {
            name: name.to_owned(),
            callable: Callable::stateless(function),
            metadata: metadata.stateful(false),
        })
    }

    /// Declares a stateful method.
    #[must_use]
    pub fn stateful<F>(self, name: &str, metadata: MethodMetadata, function: F) -> Self
    where
        F: Fn(&Session, &Arguments) -> MethodResult + Send + Sync + 'static,
    {
        self.push(MethodEntry {
            name: name.to_owned(),
            callable: Callable::stateful(function),
            metadata: metadata.stateful(true),
        })
    }

    /// Appends a prepared entry.
    #[must_use]
    pub fn push(mut self, entry: MethodEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Number of declared methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for Manifest {
    type Item = MethodEntry;
    type IntoIter = std::vec::IntoIter<MethodEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
