use crate::logging::LogFormat;
use crate::socket::SocketEndpoint;

/// Default host the RPC listener binds to.
pub const DEFAULT_LISTEN_HOST: &str = "0.0.0.0";

/// Default TCP port, shared with the reference Rust runtime server.
pub const DEFAULT_LISTEN_PORT: u16 = 50052;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Runtime tag reported alongside successful invocations.
pub const DEFAULT_RUNTIME_IDENTIFIER: &str = "rust";

/// Seconds in-flight requests may run after a shutdown signal.
pub const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 10;

/// Default log filter expression used by the binaries.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Computes the default listener endpoint.
#[must_use]
pub fn default_listen_endpoint() -> SocketEndpoint {
    SocketEndpoint::tcp(DEFAULT_LISTEN_HOST, DEFAULT_LISTEN_PORT)
}

/// Modules registered when no explicit list is configured.
#[must_use]
pub fn default_modules() -> Vec<String> {
    vec!["simple_math".to_owned()]
}

/// Owned runtime identifier used by serde defaults.
#[must_use]
pub fn default_runtime_identifier() -> String {
    DEFAULT_RUNTIME_IDENTIFIER.to_owned()
}

/// Shutdown grace period used by serde defaults.
#[must_use]
pub const fn default_shutdown_grace_secs() -> u64 {
    DEFAULT_SHUTDOWN_GRACE_SECS
}
