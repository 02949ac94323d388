//! Method modules: named groups of methods registered together.
//!
//! Modules are compiled into the server and selected by name at startup.
//! Each one describes its methods as a [`Manifest`], so registration is an
//! explicit pass over declarations rather than discovery at runtime.

mod simple_math;

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::registry::{Manifest, MethodRegistry};

pub use self::simple_math::SimpleMath;

const MODULES_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::modules");

/// A named group of methods.
pub trait MethodModule: Send + Sync {
    /// Name used to select the module in configuration.
    fn name(&self) -> &'static str;

    /// Declarations of every method the module provides.
    fn manifest(&self) -> Manifest;
}

/// Summary of a [`ModuleCatalog::load`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Modules that were registered, in request order.
    pub loaded: Vec<String>,
    /// Requested names with no matching module.
    pub unknown: Vec<String>,
    /// Total methods registered.
    pub methods: usize,
}

/// Modules available to the server, keyed by name.
#[derive(Clone, Default)]
pub struct ModuleCatalog {
    modules: BTreeMap<&'static str, Arc<dyn MethodModule>>,
}

impl ModuleCatalog {
    /// An empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalog of modules compiled into the server.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new().with_module(SimpleMath)
    }

    /// Adds `module`, replacing any module of the same name.
    #[must_use]
    pub fn with_module(mut self, module: impl MethodModule + 'static) -> Self {
        self.modules.insert(module.name(), Arc::new(module));
        self
    }

    /// Names of every available module, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.modules.keys().copied().collect()
    }

    /// Registers each named module into `registry`.
    ///
    /// Unknown names are logged and skipped; they never abort startup. A
    /// name requested twice is loaded once.
    pub fn load(&self, names: &[String], registry: &MethodRegistry) -> LoadReport {
        let mut report = LoadReport::default();
        for name in names {
            if report.loaded.contains(name) {
                continue;
            }
            let Some(module) = self.modules.get(name.as_str()) else {
                warn!(
                    target: MODULES_TARGET,
                    module = %name,
                    available = ?self.names(),
                    "unknown method module"
                );
                report.unknown.push(name.clone());
                continue;
            };
            let count = registry.register_manifest(module.manifest());
            info!(
                target: MODULES_TARGET,
                module = %name,
                methods = count,
                "method module loaded"
            );
            report.loaded.push(name.clone());
            report.methods += count;
        }
        report
    }
}

impl std::fmt::Debug for ModuleCatalog {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ModuleCatalog")
            .field("modules", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::registry::MethodMetadata;

    struct Echo;

    impl MethodModule for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn manifest(&self) -> Manifest {
            Manifest::new().stateless("echo", MethodMetadata::described("echo"), |args| {
                Ok(args.get("value").cloned().unwrap_or(Value::Null))
            })
        }
    }

    #[test]
    fn builtin_catalog_offers_simple_math() {
        assert_eq!(ModuleCatalog::builtin().names(), ["simple_math"]);
    }

    #[test]
    fn loads_requested_modules_and_reports_unknown_ones() {
        let catalog = ModuleCatalog::builtin().with_module(Echo);
        let registry = MethodRegistry::new();
        let requested = ["echo", "missing", "simple_math", "echo"].map(str::to_owned);

        let report = catalog.load(&requested, &registry);

        assert_eq!(report.loaded, ["echo", "simple_math"]);
        assert_eq!(report.unknown, ["missing"]);
        assert_eq!(report.methods, 10);
        assert_eq!(registry.len(), 10);
        assert!(registry.contains("echo"));
        assert!(registry.contains("counter_reset"));
    }

    #[test]
    fn empty_request_registers_nothing() {
        let registry = MethodRegistry::new();
        let report = ModuleCatalog::builtin().load(&[], &registry);
        assert_eq!(report, LoadReport::default());
        assert!(registry.is_empty());
    }
}
