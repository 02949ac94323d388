//! Operation handlers behind the RPC surface.
//!
//! The [`Dispatcher`] owns the registry and session store and turns each
//! decoded [`Request`] into its [`Response`]. Operation-level failures never
//! escape as Rust errors: they are folded into `success: false` replies so a
//! misbehaving callable or a bad argument cannot affect the connection or
//! the server.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use harness_protocol::{
    CreateContextRequest, CreateContextResponse, DescribeResponse, DestroyContextRequest,
    DestroyContextResponse, ExecutionMetadata, InspectStateRequest, InspectStateResponse,
    InvokeMethodRequest, InvokeMethodResponse, ListMethodsRequest, ListMethodsResponse, Request,
    Response,
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::registry::{Arguments, CallError, Callable, MethodRegistry, RegisteredMethod};
use crate::session::{Session, SessionStore};
use crate::value::decode_arguments;

use super::DISPATCH_TARGET;
use super::errors::DispatchError;

/// Dispatch behaviour switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Runtime tag copied into execution metadata.
    pub runtime_identifier: String,
    /// Reject stateful calls that arrive without a context instead of running
    /// them against a scratch session.
    pub strict_sessions: bool,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            runtime_identifier: harness_config::DEFAULT_RUNTIME_IDENTIFIER.to_owned(),
            strict_sessions: false,
        }
    }
}

impl DispatchOptions {
    /// Derives options from the resolved configuration.
    #[must_use]
    pub fn from_config(config: &harness_config::Config) -> Self {
        Self {
            runtime_identifier: config.runtime_identifier().to_owned(),
            strict_sessions: config.strict_sessions(),
        }
    }
}

/// Answers harness requests against a shared registry and session store.
#[derive(Debug)]
pub struct Dispatcher {
    registry: Arc<MethodRegistry>,
    sessions: Arc<SessionStore>,
    options: DispatchOptions,
}

/// A successful call: the produced value and how long the callable ran.
struct Outcome {
    value: Value,
    elapsed_us: u64,
}

impl Dispatcher {
    /// Builds a dispatcher over shared state.
    #[must_use]
    pub const fn new(
        registry: Arc<MethodRegistry>,
        sessions: Arc<SessionStore>,
        options: DispatchOptions,
    ) -> Self {
        Self {
            registry,
            sessions,
            options,
        }
    }

    /// The method registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<MethodRegistry> {
        &self.registry
    }

    /// The session store.
    #[must_use]
    pub const fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Active options.
    #[must_use]
    pub const fn options(&self) -> &DispatchOptions {
        &self.options
    }

    /// Answers one request.
    #[must_use]
    pub fn handle(&self, request: Request) -> Response {
        debug!(
            target: DISPATCH_TARGET,
            operation = request.operation(),
            "dispatching request"
        );
        match request {
            Request::CreateContext(input) => Response::CreateContext(self.create_context(&input)),
            Request::InvokeMethod(input) => Response::InvokeMethod(self.invoke_method(&input)),
            Request::InspectState(input) => Response::InspectState(self.inspect_state(&input)),
            Request::DestroyContext(input) => {
                Response::DestroyContext(self.destroy_context(&input))
            }
            Request::ListMethods(input) => Response::ListMethods(self.list_methods(&input)),
            Request::Describe => Response::Describe(self.describe()),
        }
    }

    /// Creates a context. Always succeeds.
    #[must_use]
    pub fn create_context(&self, request: &CreateContextRequest) -> CreateContextResponse {
        let session = self.sessions.create(request.initial_state.as_deref());
        CreateContextResponse::created(session.id().as_str())
    }

    /// Invokes a registered method.
    #[must_use]
    pub fn invoke_method(&self, request: &InvokeMethodRequest) -> InvokeMethodResponse {
        match self.try_invoke(request) {
            Ok(outcome) => InvokeMethodResponse::succeeded(
                outcome.value.to_string(),
                ExecutionMetadata {
                    execution_time_us: outcome.elapsed_us,
                    runtime: self.options.runtime_identifier.clone(),
                },
            ),
            Err(error) => {
                debug!(
                    target: DISPATCH_TARGET,
                    method = %request.method_name,
                    %error,
                    "invocation failed"
                );
                InvokeMethodResponse::failed(error.to_string())
            }
        }
    }

    /// Returns a context's state.
    #[must_use]
    pub fn inspect_state(&self, request: &InspectStateRequest) -> InspectStateResponse {
        match self.sessions.inspect(&request.context_id) {
            Ok(state) => InspectStateResponse::state(state),
            Err(error) => InspectStateResponse::failed(error.to_string()),
        }
    }

    /// Destroys a context.
    #[must_use]
    pub fn destroy_context(&self, request: &DestroyContextRequest) -> DestroyContextResponse {
        match self.sessions.destroy(&request.context_id) {
            Ok(()) => DestroyContextResponse::destroyed(),
            Err(error) => DestroyContextResponse::failed(error.to_string()),
        }
    }

    /// Lists registered methods matching the request prefix.
    #[must_use]
    pub fn list_methods(&self, request: &ListMethodsRequest) -> ListMethodsResponse {
        ListMethodsResponse {
            methods: self
                .registry
                .list(request.prefix.as_deref())
                .iter()
                .map(|method| method.to_info())
                .collect(),
        }
    }

    /// Describes the RPC surface.
    #[must_use]
    pub fn describe(&self) -> DescribeResponse {
        DescribeResponse::new(
            env!("CARGO_PKG_VERSION"),
            self.options.runtime_identifier.as_str(),
        )
    }

    /// Resolves the method, then the arguments, then the context, and only
    /// then calls. The first failing step decides the error.
    fn try_invoke(&self, request: &InvokeMethodRequest) -> Result<Outcome, DispatchError> {
        let method = self
            .registry
            .lookup(&request.method_name)
            .ok_or_else(|| DispatchError::method_not_found(&request.method_name))?;
        let arguments = decode_arguments(request.arguments.as_deref())?;
        // An empty id means no context, as with an absent one.
        let session = request
            .context_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(|id| self.sessions.get(id))
            .transpose()?;
        self.call(&method, session.as_deref(), &arguments)
    }

    fn call(
        &self,
        method: &RegisteredMethod,
        session: Option<&Session>,
        arguments: &Arguments,
    ) -> Result<Outcome, DispatchError> {
        let scratch;
        let bound = match (method.callable(), session) {
            (Callable::Stateful(_), None) if self.options.strict_sessions => {
                return Err(DispatchError::session_required(method.name()));
            }
            (Callable::Stateful(_), None) => {
                scratch = Session::detached();
                Some(&scratch)
            }
            (_, given) => given,
        };

        let started = Instant::now();
        let result = panic::catch_unwind(AssertUnwindSafe(|| match (method.callable(), bound) {
            (Callable::Stateful(function), Some(session)) => function(session, arguments),
            (Callable::Stateful(_), None) => Err(CallError::new("no context available")),
            (Callable::Stateless(function), _) => function(arguments),
        }));
        let elapsed_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

        match result {
            Ok(Ok(value)) => Ok(Outcome { value, elapsed_us }),
            Ok(Err(error)) => Err(DispatchError::callable_failure(error.message())),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(
                    target: DISPATCH_TARGET,
                    method = method.name(),
                    message = %message,
                    "callable panicked"
                );
                Err(DispatchError::callable_failure(message))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|text| (*text).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "method panicked".to_owned())
}
