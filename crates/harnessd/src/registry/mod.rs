//! Process-wide table of invocable methods.
//!
//! The registry maps method names to their callable and descriptive
//! metadata. Registration may happen at any time, including while requests
//! are being served; readers see either the previous or the new entry, never
//! a torn one. Listing preserves the order in which names were first
//! registered, and re-registering a name replaces the entry in place.

mod callable;
mod manifest;

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use harness_protocol::MethodInfo;
use tracing::{debug, info};

pub use self::callable::{
    Arguments, CallError, Callable, MethodResult, StatefulFn, StatelessFn,
};
pub use self::manifest::{Manifest, MethodEntry};

const REGISTRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::registry");

/// Descriptive information attached to a registered method.
///
/// Parameter and return types are free-form tags (`"int"`, `"dict"`, ...)
/// shown to clients; they are never used for validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodMetadata {
    /// Free-form description.
    pub description: String,
    /// Whether the method reads or writes session state.
    pub is_stateful: bool,
    /// Parameter type tags in declaration order.
    pub parameter_types: Vec<String>,
    /// Return type tag.
    pub return_type: String,
}

impl MethodMetadata {
    /// Starts metadata with a description.
    #[must_use]
    pub fn described(description: &str) -> Self {
        Self {
            description: description.to_owned(),
            ..Self::default()
        }
    }

    /// Sets the parameter type tags.
    #[must_use]
    pub fn params(mut self, types: &[&str]) -> Self {
        self.parameter_types = types.iter().map(|tag| (*tag).to_owned()).collect();
        self
    }

    /// Sets the return type tag.
    #[must_use]
    pub fn returns(mut self, tag: &str) -> Self {
        tag.clone_into(&mut self.return_type);
        self
    }

    /// Sets the stateful flag.
    #[must_use]
    pub const fn stateful(mut self, is_stateful: bool) -> Self {
        self.is_stateful = is_stateful;
        self
    }
}

/// A method as stored in the registry.
#[derive(Debug)]
pub struct RegisteredMethod {
    name: String,
    callable: Callable,
    metadata: MethodMetadata,
}

impl RegisteredMethod {
    /// Registered name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Executable behaviour.
    #[must_use]
    pub const fn callable(&self) -> &Callable {
        &self.callable
    }

    /// Descriptive metadata.
    #[must_use]
    pub const fn metadata(&self) -> &MethodMetadata {
        &self.metadata
    }

    /// Wire representation used by `list_methods`.
    #[must_use]
    pub fn to_info(&self) -> MethodInfo {
        MethodInfo {
            name: self.name.clone(),
            description: self.metadata.description.clone(),
            is_stateful: self.metadata.is_stateful,
            parameter_types: self.metadata.parameter_types.clone(),
            return_type: self.metadata.return_type.clone(),
        }
    }
}

#[derive(Debug, Default)]
struct RegistryTable {
    order: Vec<String>,
    entries: HashMap<String, Arc<RegisteredMethod>>,
}

/// Concurrent method registry shared by every connection.
#[derive(Debug, Default)]
pub struct MethodRegistry {
    table: RwLock<RegistryTable>,
}

impl MethodRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name`, replacing any previous entry of the same name.
    ///
    /// A replaced entry keeps its original listing position.
    pub fn register(&self, name: &str, callable: Callable, metadata: MethodMetadata) {
        let method = Arc::new(RegisteredMethod {
            name: name.to_owned(),
            callable,
            metadata,
        });
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        if table.entries.insert(name.to_owned(), method).is_some() {
            debug!(target: REGISTRY_TARGET, method = name, "method replaced");
        } else {
            table.order.push(name.to_owned());
            debug!(target: REGISTRY_TARGET, method = name, "method registered");
        }
    }

    /// Registers every entry of `manifest` in declaration order and returns
    /// how many were registered.
    pub fn register_manifest(&self, manifest: Manifest) -> usize {
        let mut count = 0_usize;
        for entry in manifest {
            self.register(&entry.name, entry.callable, entry.metadata);
            count += 1;
        }
        info!(target: REGISTRY_TARGET, methods = count, "manifest registered");
        count
    }

    /// Looks up a method by exact name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Arc<RegisteredMethod>> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        table.entries.get(name).cloned()
    }

    /// Lists methods whose names start with `prefix`, in registration order.
    ///
    /// `None` and the empty prefix both match every method.
    #[must_use]
    pub fn list(&self, prefix: Option<&str>) -> Vec<Arc<RegisteredMethod>> {
        let wanted = prefix.unwrap_or_default();
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        table
            .order
            .iter()
            .filter(|name| name.starts_with(wanted))
            .filter_map(|name| table.entries.get(name).cloned())
            .collect()
    }

    /// Whether `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        table.entries.contains_key(name)
    }

    /// Number of registered methods.
    #[must_use]
    pub fn len(&self) -> usize {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        table.order.len()
    }

    /// Whether no method is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
