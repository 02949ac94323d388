//! Sequences server startup, serving, and graceful shutdown.

use std::sync::Arc;

use tracing::info;

use crate::bootstrap::{ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::dispatch::DispatchConnectionHandler;
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::modules::ModuleCatalog;
use crate::transport::{DrainOutcome, SocketListener};

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// Collaborators required to run the server.
pub(crate) struct LaunchPlan<L, S> {
    pub(crate) loader: L,
    pub(crate) shutdown: S,
    pub(crate) reporter: Arc<dyn HealthReporter>,
    pub(crate) catalog: ModuleCatalog,
}

/// Runs the server using the production collaborators until a termination
/// signal arrives.
///
/// # Errors
///
/// Returns [`LaunchError`] when bootstrap fails, the endpoint cannot be
/// bound, or signal handlers cannot be installed.
pub fn run_server() -> Result<(), LaunchError> {
    run_server_with(LaunchPlan {
        loader: SystemConfigLoader,
        shutdown: SystemShutdownSignal,
        reporter: Arc::new(StructuredHealthReporter::new()),
        catalog: ModuleCatalog::builtin(),
    })
}

/// Runs the server with injected collaborators.
pub(crate) fn run_server_with<L, S>(plan: LaunchPlan<L, S>) -> Result<(), LaunchError>
where
    L: ConfigLoader,
    S: ShutdownSignal,
{
    let LaunchPlan {
        loader,
        shutdown,
        reporter,
        catalog,
    } = plan;

    let harness = bootstrap_with(&loader, reporter.as_ref(), &catalog)?;
    let config = harness.config();
    let listener = SocketListener::bind(config.listen())?;
    let endpoint = listener.bound_endpoint();
    let handler = Arc::new(DispatchConnectionHandler::new(Arc::clone(
        harness.dispatcher(),
    )));
    let listener_handle = listener.start(handler)?;
    reporter.listener_ready(&endpoint);

    shutdown.wait()?;

    let grace = config.shutdown_grace();
    info!(
        target: PROCESS_TARGET,
        open_connections = listener_handle.in_flight(),
        "stopping listener"
    );
    reporter.drain_started(grace);
    let remaining = match listener_handle.drain(grace)? {
        DrainOutcome::Drained => 0,
        DrainOutcome::TimedOut { remaining } => remaining,
    };
    reporter.drain_finished(remaining);
    info!(
        target: PROCESS_TARGET,
        "shutdown sequence completed"
    );
    Ok(())
}
