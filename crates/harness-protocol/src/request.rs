//! Request envelopes accepted by the harness.

use serde::{Deserialize, Serialize};

/// A single request line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Request {
    /// Creates a new execution context.
    CreateContext(CreateContextRequest),
    /// Invokes a registered method.
    InvokeMethod(InvokeMethodRequest),
    /// Reads the state held by a context.
    InspectState(InspectStateRequest),
    /// Destroys a context.
    DestroyContext(DestroyContextRequest),
    /// Lists registered methods.
    ListMethods(ListMethodsRequest),
    /// Describes the RPC surface itself.
    Describe,
}

impl Request {
    /// Canonical operation name, as written in the `operation` tag.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::CreateContext(_) => "create_context",
            Self::InvokeMethod(_) => "invoke_method",
            Self::InspectState(_) => "inspect_state",
            Self::DestroyContext(_) => "destroy_context",
            Self::ListMethods(_) => "list_methods",
            Self::Describe => "describe",
        }
    }
}

/// Input for `create_context`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateContextRequest {
    /// JSON object text used to seed the context state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_state: Option<String>,
}

/// Input for `invoke_method`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokeMethodRequest {
    /// Registered method name.
    pub method_name: String,
    /// Context the invocation is bound to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
    /// JSON object text mapping parameter names to values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

impl InvokeMethodRequest {
    /// Builds a stateless invocation.
    #[must_use]
    pub fn new(method_name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            method_name: method_name.into(),
            context_id: None,
            arguments: Some(arguments.into()),
        }
    }

    /// Binds the invocation to a context.
    #[must_use]
    pub fn in_context(mut self, context_id: impl Into<String>) -> Self {
        self.context_id = Some(context_id.into());
        self
    }
}

/// Input for `inspect_state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectStateRequest {
    /// Context to inspect.
    pub context_id: String,
}

/// Input for `destroy_context`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestroyContextRequest {
    /// Context to destroy.
    pub context_id: String,
}

/// Input for `list_methods`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMethodsRequest {
    /// Only names starting with this prefix are returned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn parse(line: &str) -> Request {
        serde_json::from_str(line).expect("parse request")
    }

    #[test]
    fn parses_invoke_with_context() {
        let request = parse(
            r#"{"operation":"invoke_method","method_name":"counter_increment","context_id":"abc"}"#,
        );
        let Request::InvokeMethod(invoke) = request else {
            panic!("expected invoke_method, got {request:?}");
        };
        assert_eq!(invoke.method_name, "counter_increment");
        assert_eq!(invoke.context_id.as_deref(), Some("abc"));
        assert_eq!(invoke.arguments, None);
    }

    #[rstest]
    #[case::create(r#"{"operation":"create_context"}"#, "create_context")]
    #[case::seeded(r#"{"operation":"create_context","initial_state":"{}"}"#, "create_context")]
    #[case::inspect(r#"{"operation":"inspect_state","context_id":"x"}"#, "inspect_state")]
    #[case::destroy(r#"{"operation":"destroy_context","context_id":"x"}"#, "destroy_context")]
    #[case::list(r#"{"operation":"list_methods"}"#, "list_methods")]
    #[case::list_prefix(r#"{"operation":"list_methods","prefix":"counter_"}"#, "list_methods")]
    #[case::describe(r#"{"operation":"describe"}"#, "describe")]
    fn recognises_every_operation(#[case] line: &str, #[case] expected: &str) {
        assert_eq!(parse(line).operation(), expected);
    }

    #[test]
    fn rejects_unknown_operation() {
        let result = serde_json::from_str::<Request>(r#"{"operation":"reboot"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn builder_omits_absent_context() {
        let request = Request::InvokeMethod(InvokeMethodRequest::new("add", r#"{"a":1}"#));
        let line = serde_json::to_string(&request).expect("serialize");
        assert!(line.contains(r#""operation":"invoke_method""#));
        assert!(!line.contains("context_id"));
    }
}
