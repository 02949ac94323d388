//! Test harness utilities shared by the behavioural suites.

use std::ffi::OsString;
use std::io::{BufRead, BufReader, Write};
use std::sync::{Arc, Mutex, mpsc};
use std::time::Duration;

use harness_config::{Config, SocketEndpoint};
use harness_protocol::{Request, Response};
use ortho_config::OrthoError;

use crate::bootstrap::{BootstrapError, ConfigLoader};
use crate::dispatch::{DispatchOptions, Dispatcher};
use crate::health::HealthReporter;
use crate::modules::{LoadReport, ModuleCatalog};
use crate::process::{ShutdownError, ShutdownSignal};
use crate::registry::MethodRegistry;
use crate::session::SessionStore;

/// Builds a dispatcher with the built-in modules loaded.
pub fn dispatcher_with(options: DispatchOptions) -> Dispatcher {
    let registry = Arc::new(MethodRegistry::new());
    ModuleCatalog::builtin().load(&["simple_math".to_owned()], &registry);
    Dispatcher::new(registry, Arc::new(SessionStore::new()), options)
}

/// Configuration binding an ephemeral loopback port with logging disabled.
pub fn test_config() -> Config {
    Config {
        listen: SocketEndpoint::tcp("127.0.0.1", 0),
        log_filter: "off".to_owned(),
        shutdown_grace_secs: 2,
        ..Config::default()
    }
}

/// Loader that intentionally fails by passing invalid CLI arguments.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("harnessd"),
            OsString::from("--listen"),
            OsString::from("invalid://socket"),
        ];
        Config::load_from_iter(args)
    }
}

/// Structured health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    BootstrapStarting,
    BootstrapSucceeded,
    BootstrapFailed(String),
    ModulesLoaded(LoadReport),
    ListenerReady(SocketEndpoint),
    DrainStarted(Duration),
    DrainFinished(usize),
}

/// Records health events for assertions and announces readiness.
#[derive(Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
    ready: Mutex<Option<mpsc::Sender<SocketEndpoint>>>,
}

impl RecordingHealthReporter {
    /// Builds a reporter that sends the bound endpoint once listening.
    pub fn announcing(sender: mpsc::Sender<SocketEndpoint>) -> Self {
        Self {
            events: Mutex::default(),
            ready: Mutex::new(Some(sender)),
        }
    }

    /// Captures a copy of the recorded events.
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn modules_loaded(&self, report: &LoadReport) {
        self.record(HealthEvent::ModulesLoaded(report.clone()));
    }

    fn listener_ready(&self, endpoint: &SocketEndpoint) {
        self.record(HealthEvent::ListenerReady(endpoint.clone()));
        if let Some(sender) = self
            .ready
            .lock()
            .expect("ready sender mutex poisoned")
            .take()
        {
            sender.send(endpoint.clone()).expect("announce endpoint");
        }
    }

    fn drain_started(&self, grace: Duration) {
        self.record(HealthEvent::DrainStarted(grace));
    }

    fn drain_finished(&self, remaining: usize) {
        self.record(HealthEvent::DrainFinished(remaining));
    }
}

/// Shutdown signal fired explicitly by the test.
pub struct TriggeredShutdown {
    receiver: Mutex<mpsc::Receiver<()>>,
}

impl TriggeredShutdown {
    /// Returns the signal and the trigger that releases it.
    pub fn pair() -> (Self, mpsc::Sender<()>) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                receiver: Mutex::new(receiver),
            },
            sender,
        )
    }
}

impl ShutdownSignal for TriggeredShutdown {
    fn wait(&self) -> Result<(), ShutdownError> {
        let receiver = self
            .receiver
            .lock()
            .expect("shutdown receiver mutex poisoned");
        // A dropped trigger counts as a shutdown request.
        let _ = receiver.recv();
        Ok(())
    }
}

/// JSONL client speaking to a running listener.
pub struct JsonlClient<S: std::io::Read + Write> {
    reader: BufReader<S>,
    writer: S,
}

impl<S: std::io::Read + Write> JsonlClient<S> {
    pub fn new(reader: S, writer: S) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer,
        }
    }

    /// Sends one raw line and reads one response.
    pub fn send_line(&mut self, line: &str) -> Response {
        self.writer
            .write_all(format!("{line}\n").as_bytes())
            .expect("write request");
        self.writer.flush().expect("flush request");
        let mut reply = String::new();
        let read = self.reader.read_line(&mut reply).expect("read response");
        assert!(read > 0, "server closed the connection");
        serde_json::from_str(&reply).expect("response is JSON")
    }

    /// Sends a typed request and reads one response.
    pub fn request(&mut self, request: &Request) -> Response {
        let line = serde_json::to_string(request).expect("serialize request");
        self.send_line(&line)
    }
}
