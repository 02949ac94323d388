//! Self-description of the RPC surface for ad-hoc tooling.

use serde::{Deserialize, Serialize};

/// Name the service reports about itself.
pub const SERVICE_NAME: &str = "transpile_test.TranspileTestService";

/// One operation of the RPC surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    /// Value of the `operation` tag.
    pub name: String,
    /// What the operation does.
    pub description: String,
    /// Request fields, `?` marking optional ones.
    pub inputs: Vec<String>,
    /// Response fields, `?` marking optional ones.
    pub outputs: Vec<String>,
}

impl OperationDescriptor {
    fn new(name: &str, description: &str, inputs: &[&str], outputs: &[&str]) -> Self {
        Self {
            name: name.to_owned(),
            description: description.to_owned(),
            inputs: inputs.iter().map(|field| (*field).to_owned()).collect(),
            outputs: outputs.iter().map(|field| (*field).to_owned()).collect(),
        }
    }

    /// Every operation the harness answers, in protocol order.
    #[must_use]
    pub fn catalogue() -> Vec<Self> {
        vec![
            Self::new(
                "create_context",
                "Create an execution context, optionally seeded with JSON object state",
                &["initial_state?"],
                &["context_id?", "success", "error?"],
            ),
            Self::new(
                "invoke_method",
                "Invoke a registered method, optionally bound to a context",
                &["method_name", "context_id?", "arguments?"],
                &["success", "result?", "error?", "metadata?"],
            ),
            Self::new(
                "inspect_state",
                "Return the JSON state of a context",
                &["context_id"],
                &["success", "state?", "error?"],
            ),
            Self::new(
                "destroy_context",
                "Destroy a context; its id becomes invalid",
                &["context_id"],
                &["success", "error?"],
            ),
            Self::new(
                "list_methods",
                "List registered methods whose names start with a prefix",
                &["prefix?"],
                &["methods"],
            ),
            Self::new(
                "describe",
                "Describe the operations of this service",
                &[],
                &["service", "version", "runtime", "operations"],
            ),
        ]
    }
}

/// Output of `describe`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescribeResponse {
    /// Service name.
    pub service: String,
    /// Server version.
    pub version: String,
    /// Runtime identifier of this server.
    pub runtime: String,
    /// Supported operations.
    pub operations: Vec<OperationDescriptor>,
}

impl DescribeResponse {
    /// Builds the description for a server version and runtime tag.
    #[must_use]
    pub fn new(version: impl Into<String>, runtime: impl Into<String>) -> Self {
        Self {
            service: SERVICE_NAME.to_owned(),
            version: version.into(),
            runtime: runtime.into(),
            operations: OperationDescriptor::catalogue(),
        }
    }
}
