//! Structured health reporting for server lifecycle events.

use std::sync::Arc;
use std::time::Duration;

use harness_config::{Config, SocketEndpoint};

use crate::bootstrap::BootstrapError;
use crate::modules::LoadReport;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked after method modules were registered.
    fn modules_loaded(&self, report: &LoadReport);

    /// Invoked once the listener accepts connections on `endpoint`.
    fn listener_ready(&self, endpoint: &SocketEndpoint);

    /// Invoked when shutdown begins draining open connections.
    fn drain_started(&self, grace: Duration);

    /// Invoked when draining ends; `remaining` connections were still open.
    fn drain_finished(&self, remaining: usize);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn modules_loaded(&self, report: &LoadReport) {
        (**self).modules_loaded(report);
    }

    fn listener_ready(&self, endpoint: &SocketEndpoint) {
        (**self).listener_ready(endpoint);
    }

    fn drain_started(&self, grace: Duration) {
        (**self).drain_started(grace);
    }

    fn drain_finished(&self, remaining: usize) {
        (**self).drain_finished(remaining);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting harness bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            listen = %config.listen(),
            runtime = config.runtime_identifier(),
            strict_sessions = config.strict_sessions(),
            log_filter = %config.log_filter(),
            log_format = ?config.log_format(),
            "harness bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "harness bootstrap failed"
        );
    }

    fn modules_loaded(&self, report: &LoadReport) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "modules_loaded",
            loaded = ?report.loaded,
            unknown = ?report.unknown,
            methods = report.methods,
            "method modules registered"
        );
    }

    fn listener_ready(&self, endpoint: &SocketEndpoint) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "listener_ready",
            endpoint = %endpoint,
            "harness listening"
        );
    }

    fn drain_started(&self, grace: Duration) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "drain_started",
            grace_ms = grace.as_millis(),
            "draining open connections"
        );
    }

    fn drain_finished(&self, remaining: usize) {
        if remaining == 0 {
            tracing::info!(
                target: HEALTH_TARGET,
                event = "drain_finished",
                "all connections closed"
            );
        } else {
            tracing::warn!(
                target: HEALTH_TARGET,
                event = "drain_finished",
                remaining,
                "grace period expired with open connections"
            );
        }
    }
}
