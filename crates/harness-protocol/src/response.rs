//! Response envelopes produced by the harness.
//!
//! Failure is always reported in-band: `success` is `false` and `error`
//! carries a human-readable message. There is no separate error code field,
//! so clients distinguish failure kinds by message text.

use serde::{Deserialize, Serialize};

use crate::describe::DescribeResponse;

/// A single response line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Response {
    /// Reply to `create_context`.
    CreateContext(CreateContextResponse),
    /// Reply to `invoke_method`.
    InvokeMethod(InvokeMethodResponse),
    /// Reply to `inspect_state`.
    InspectState(InspectStateResponse),
    /// Reply to `destroy_context`.
    DestroyContext(DestroyContextResponse),
    /// Reply to `list_methods`.
    ListMethods(ListMethodsResponse),
    /// Reply to `describe`.
    Describe(DescribeResponse),
    /// The request line could not be understood.
    Rejected(RejectedResponse),
}

/// Output of `create_context`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateContextResponse {
    /// Identifier of the new context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
    /// Whether the context was created.
    pub success: bool,
    /// Failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CreateContextResponse {
    /// Successful creation.
    #[must_use]
    pub fn created(context_id: impl Into<String>) -> Self {
        Self {
            context_id: Some(context_id.into()),
            success: true,
            error: None,
        }
    }
}

/// Timing and runtime details attached to a successful invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionMetadata {
    /// Wall-clock duration of the callable alone, in whole microseconds.
    pub execution_time_us: u64,
    /// Identifier of the runtime that executed the call.
    pub runtime: String,
}

/// Output of `invoke_method`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokeMethodResponse {
    /// Whether the invocation produced a result.
    pub success: bool,
    /// JSON text of the returned value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// Failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Execution details; only present on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ExecutionMetadata>,
}

impl InvokeMethodResponse {
    /// Successful invocation.
    #[must_use]
    pub fn succeeded(result: impl Into<String>, metadata: ExecutionMetadata) -> Self {
        Self {
            success: true,
            result: Some(result.into()),
            error: None,
            metadata: Some(metadata),
        }
    }

    /// Failed invocation. No metadata is reported.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.into()),
            metadata: None,
        }
    }
}

/// Output of `inspect_state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectStateResponse {
    /// Whether the context exists.
    pub success: bool,
    /// JSON object text of the context state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InspectStateResponse {
    /// Successful inspection.
    #[must_use]
    pub fn state(state: impl Into<String>) -> Self {
        Self {
            success: true,
            state: Some(state.into()),
            error: None,
        }
    }

    /// Failed inspection.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            state: None,
            error: Some(error.into()),
        }
    }
}

/// Output of `destroy_context`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestroyContextResponse {
    /// Whether a context was removed.
    pub success: bool,
    /// Failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DestroyContextResponse {
    /// Successful removal.
    #[must_use]
    pub const fn destroyed() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// Failed removal.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Descriptive metadata of one registered method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInfo {
    /// Registered name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Whether the method reads or writes context state.
    pub is_stateful: bool,
    /// Declared parameter type tags, in order.
    pub parameter_types: Vec<String>,
    /// Declared return type tag.
    pub return_type: String,
}

/// Output of `list_methods`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMethodsResponse {
    /// Matching methods in registration order.
    pub methods: Vec<MethodInfo>,
}

/// Reply to a request line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedResponse {
    /// Why the line was rejected.
    pub error: String,
}
