//! Response serialization helpers for the dispatch loop.

use std::io::Write;

use harness_protocol::{RejectedResponse, Response};

use super::errors::DispatchError;

/// Writer that serializes responses to a stream.
///
/// The writer handles JSONL framing and flushes after every response so a
/// client waiting on one reply is never left blocked on a buffer.
pub struct ResponseWriter<W> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    /// Creates a new response writer wrapping the given output stream.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes a response as a JSONL line and flushes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization, writing, or flushing fails.
    pub fn write_response(&mut self, response: &Response) -> Result<(), DispatchError> {
        serde_json::to_writer(&mut self.writer, response)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Writes a `rejected` response describing `error`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_rejection(&mut self, error: &DispatchError) -> Result<(), DispatchError> {
        self.write_response(&Response::Rejected(RejectedResponse {
            error: error.to_string(),
        }))
    }
}
