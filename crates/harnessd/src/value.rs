//! Conversions between JSON text on the wire and structured values.

use std::fmt::Debug;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::registry::Arguments;

/// Failure to decode a JSON object from request text.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The text is not valid JSON.
    #[error("{0}")]
    Syntax(#[from] serde_json::Error),
    /// The text is valid JSON but not an object.
    #[error("expected a JSON object, found {found}")]
    NotAnObject {
        /// JSON type of the decoded value.
        found: &'static str,
    },
}

/// Decodes invocation arguments.
///
/// Absent or blank text yields an empty argument set.
///
/// # Errors
///
/// Returns [`DecodeError`] when the text is not a JSON object.
pub fn decode_arguments(text: Option<&str>) -> Result<Arguments, DecodeError> {
    match text.map(str::trim) {
        None | Some("") => Ok(Arguments::default()),
        Some(body) => decode_object(body).map(Arguments::new),
    }
}

/// Decodes `text` as a JSON object.
///
/// # Errors
///
/// Returns [`DecodeError`] when the text is malformed or not an object.
pub fn decode_object(text: &str) -> Result<Map<String, Value>, DecodeError> {
    match serde_json::from_str::<Value>(text)? {
        Value::Object(map) => Ok(map),
        other => Err(DecodeError::NotAnObject {
            found: json_type(&other),
        }),
    }
}

/// Converts a native value into JSON, falling back to its debug rendering
/// when it has no JSON representation.
///
/// Callables use this to build their result [`Value`] from native Rust
/// types, so a result that `serde_json` cannot encode (a map with non-string
/// keys, say) still reaches the client as text instead of failing the call.
pub fn to_structured<T>(value: &T) -> Value
where
    T: Serialize + Debug + ?Sized,
{
    serde_json::to_value(value).unwrap_or_else(|_| Value::String(format!("{value:?}")))
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
