//! Remote test harness for cross-runtime transpilation testing.
//!
//! `harnessd` exposes in-process functions over a small JSONL RPC surface so
//! that an external test runner can call the same named function in several
//! runtimes and compare the results. The crate provides:
//!
//! - a [`MethodRegistry`] mapping names to stateless or stateful callables
//!   with descriptive metadata;
//! - a [`SessionStore`] of isolated, named state maps ("contexts") that
//!   stateful callables read and write;
//! - a [`Dispatcher`] answering the six operations (`create_context`,
//!   `invoke_method`, `inspect_state`, `destroy_context`, `list_methods`,
//!   `describe`);
//! - the socket transport, bootstrap, and process lifecycle that put the
//!   dispatcher on the network.
//!
//! Every failure a client can cause is reported in-band with `success:
//! false`; a failing or panicking callable never takes the server down.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use harness_protocol::{InvokeMethodRequest, Request, Response};
//! use harnessd::{DispatchOptions, Dispatcher, MethodRegistry, ModuleCatalog, SessionStore};
//!
//! let registry = Arc::new(MethodRegistry::new());
//! ModuleCatalog::builtin().load(&["simple_math".to_owned()], &registry);
//! let dispatcher = Dispatcher::new(registry, Arc::new(SessionStore::new()), DispatchOptions::default());
//!
//! let reply = dispatcher.handle(Request::InvokeMethod(InvokeMethodRequest::new(
//!     "add",
//!     r#"{"a": 2, "b": 3}"#,
//! )));
//! assert!(matches!(reply, Response::InvokeMethod(result) if result.result.as_deref() == Some("5")));
//! ```

mod bootstrap;
mod dispatch;
mod health;
mod modules;
mod process;
mod registry;
mod session;
pub mod telemetry;
mod transport;
pub mod value;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Harness, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use dispatch::{DispatchConnectionHandler, DispatchError, DispatchOptions, Dispatcher};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use modules::{LoadReport, MethodModule, ModuleCatalog, SimpleMath};
pub use process::{LaunchError, ShutdownError, ShutdownSignal, SystemShutdownSignal, run_server};
pub use registry::{
    Arguments, CallError, Callable, Manifest, MethodEntry, MethodMetadata, MethodRegistry,
    MethodResult, RegisteredMethod, StatefulFn, StatelessFn,
};
pub use session::{Session, SessionError, SessionId, SessionStore};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::ListenerError;

#[cfg(test)]
mod tests;
