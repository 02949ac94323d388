//! Request deserialization for the dispatch loop.

use harness_protocol::Request;

use super::errors::DispatchError;

/// Parses a JSONL line into a request.
///
/// Trailing whitespace (including the newline delimiter) is trimmed before
/// parsing.
///
/// # Errors
///
/// Returns `DispatchError::MalformedRequest` if the line is empty or does not
/// match any request shape.
pub fn parse_request(line: &[u8]) -> Result<Request, DispatchError> {
    let trimmed = line.trim_ascii();
    if trimmed.is_empty() {
        return Err(DispatchError::malformed("empty request line"));
    }

    serde_json::from_slice(trimmed).map_err(|error| DispatchError::malformed(error.to_string()))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn parses_minimal_request() {
        let request = parse_request(br#"{"operation":"list_methods"}"#).expect("parse minimal");
        assert_eq!(request.operation(), "list_methods");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let request =
            parse_request(b"  {\"operation\":\"describe\"}  \r\n").expect("parse with whitespace");
        assert_eq!(request, Request::Describe);
    }

    #[rstest]
    #[case::empty(b"")]
    #[case::whitespace(b"   \n")]
    #[case::invalid_json(b"not json")]
    #[case::unknown_operation(br#"{"operation":"reboot"}"#)]
    #[case::missing_method(br#"{"operation":"invoke_method"}"#)]
    fn rejects_unusable_lines(#[case] line: &[u8]) {
        let result = parse_request(line);
        assert!(matches!(result, Err(DispatchError::MalformedRequest { .. })));
    }
}
