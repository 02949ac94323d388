//! Shared configuration for the transpilation test harness.
//!
//! Configuration is layered with `ortho_config`: compiled-in defaults are
//! overridden by a configuration file, then by `HARNESS_*` environment
//! variables, and finally by command-line flags. The resulting [`Config`]
//! describes where the server listens, how it logs, which method modules it
//! loads at startup, and how it behaves when draining on shutdown.

mod defaults;
mod logging;
mod socket;

use std::ffi::OsString;
use std::sync::Arc;
use std::time::Duration;

use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LISTEN_HOST, DEFAULT_LISTEN_PORT, DEFAULT_LOG_FILTER, DEFAULT_RUNTIME_IDENTIFIER,
    DEFAULT_SHUTDOWN_GRACE_SECS, default_listen_endpoint, default_log_filter,
    default_log_filter_string, default_log_format, default_modules, default_runtime_identifier,
    default_shutdown_grace_secs,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use socket::{SocketEndpoint, SocketParseError, SocketPreparationError};

/// Resolved harness configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "HARNESS")]
pub struct Config {
    /// Endpoint the RPC listener binds to.
    #[serde(default = "default_listen_endpoint")]
    pub listen: SocketEndpoint,
    /// `tracing` filter expression applied to the global subscriber.
    #[serde(default = "default_log_filter_string")]
    pub log_filter: String,
    /// Output format for structured logs.
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
    /// Names of the method modules registered at startup.
    #[serde(default = "default_modules")]
    pub modules: Vec<String>,
    /// Runtime tag reported in execution metadata.
    #[serde(default = "default_runtime_identifier")]
    pub runtime_identifier: String,
    /// Rejects stateful invocations that arrive without a context.
    #[serde(default)]
    pub strict_sessions: bool,
    /// Seconds granted to in-flight requests once shutdown begins.
    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen_endpoint(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            modules: default_modules(),
            runtime_identifier: default_runtime_identifier(),
            strict_sessions: false,
            shutdown_grace_secs: DEFAULT_SHUTDOWN_GRACE_SECS,
        }
    }
}

impl Config {
    /// Loads configuration from the process arguments, environment, and files.
    ///
    /// # Errors
    ///
    /// Returns the aggregated `ortho_config` error when any layer fails to
    /// parse or merge.
    pub fn load() -> Result<Self, Arc<OrthoError>> {
        Self::load_from_iter(std::env::args_os())
    }

    /// Loads configuration from an explicit argument list.
    ///
    /// The first item is treated as the binary name, matching
    /// [`std::env::args_os`].
    ///
    /// # Errors
    ///
    /// Returns the aggregated `ortho_config` error when any layer fails to
    /// parse or merge.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, Arc<OrthoError>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as OrthoConfig>::load_from_iter(args)
    }

    /// Endpoint the listener binds to.
    #[must_use]
    pub const fn listen(&self) -> &SocketEndpoint {
        &self.listen
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Module names requested for startup registration.
    #[must_use]
    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    /// Runtime tag attached to successful invocation metadata.
    #[must_use]
    pub fn runtime_identifier(&self) -> &str {
        self.runtime_identifier.as_str()
    }

    /// Whether stateful methods require a bound context.
    #[must_use]
    pub const fn strict_sessions(&self) -> bool {
        self.strict_sessions
    }

    /// Grace period for draining in-flight requests.
    #[must_use]
    pub const fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_listens_on_reference_port() {
        let config = Config::default();
        assert_eq!(
            config.listen(),
            &SocketEndpoint::tcp(DEFAULT_LISTEN_HOST, DEFAULT_LISTEN_PORT)
        );
        assert_eq!(config.runtime_identifier(), "rust");
        assert_eq!(config.modules(), ["simple_math".to_owned()]);
        assert!(!config.strict_sessions());
    }

    #[test]
    fn shutdown_grace_is_expressed_in_seconds() {
        let config = Config {
            shutdown_grace_secs: 3,
            ..Config::default()
        };
        assert_eq!(config.shutdown_grace(), Duration::from_secs(3));
    }
}
