//! Connection handler that dispatches JSONL requests.
//!
//! A connection carries any number of request lines; each is answered with
//! exactly one response line, in order. A line that cannot be parsed gets a
//! `rejected` reply and the connection stays open. A line over the size
//! limit is rejected too; the rest of it is read and discarded so framing
//! resumes at the next newline.

use std::io::{self, BufRead, BufReader, Read};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::transport::{ConnectionHandler, ConnectionStream};

use super::DISPATCH_TARGET;
use super::dispatcher::Dispatcher;
use super::errors::DispatchError;
use super::request::parse_request;
use super::response::ResponseWriter;

/// Maximum size of a single request line in bytes.
pub(crate) const MAX_REQUEST_BYTES: usize = 1024 * 1024;

/// Connection handler that parses and dispatches JSONL requests.
#[derive(Debug, Clone)]
pub struct DispatchConnectionHandler {
    dispatcher: Arc<Dispatcher>,
}

/// What the read loop should do after reading one line.
enum LineRead {
    Line(Vec<u8>),
    TooLarge,
    Closed,
}

impl DispatchConnectionHandler {
    /// Creates a handler that answers with `dispatcher`.
    #[must_use]
    pub const fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    fn serve(&self, stream: ConnectionStream) -> Result<(), DispatchError> {
        let mut reader = BufReader::new(stream.try_clone()?);
        let mut writer = ResponseWriter::new(stream);

        loop {
            match read_request_line(&mut reader)? {
                LineRead::Closed => {
                    debug!(target: DISPATCH_TARGET, "client disconnected");
                    return Ok(());
                }
                LineRead::TooLarge => {
                    let error = DispatchError::request_too_large(MAX_REQUEST_BYTES);
                    warn!(target: DISPATCH_TARGET, %error, "oversized request discarded");
                    writer.write_rejection(&error)?;
                }
                LineRead::Line(bytes) if bytes.trim_ascii().is_empty() => {}
                LineRead::Line(bytes) => match parse_request(&bytes) {
                    Ok(request) => {
                        let response = self.dispatcher.handle(request);
                        writer.write_response(&response)?;
                    }
                    Err(error) => {
                        warn!(target: DISPATCH_TARGET, %error, "malformed request");
                        writer.write_rejection(&error)?;
                    }
                },
            }
        }
    }
}

impl ConnectionHandler for DispatchConnectionHandler {
    fn handle(&self, stream: ConnectionStream) {
        if let Err(error) = self.serve(stream) {
            warn!(target: DISPATCH_TARGET, %error, "connection ended with error");
        }
    }
}

/// Reads one newline-terminated line of at most [`MAX_REQUEST_BYTES`].
///
/// A final line without a newline is still returned when the peer closes.
fn read_request_line<R: Read>(reader: &mut BufReader<R>) -> io::Result<LineRead> {
    let mut buffer = Vec::new();
    let limit = u64::try_from(MAX_REQUEST_BYTES).unwrap_or(u64::MAX);
    let read = loop {
        match reader.by_ref().take(limit + 1).read_until(b'\n', &mut buffer) {
            Ok(read) => break read,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error) => return Err(error),
        }
    };

    if read == 0 {
        return Ok(LineRead::Closed);
    }
    let content = buffer.strip_suffix(b"\n").map_or(buffer.len(), <[u8]>::len);
    if content > MAX_REQUEST_BYTES {
        if !buffer.ends_with(b"\n") {
            reader.skip_until(b'\n')?;
        }
        return Ok(LineRead::TooLarge);
    }
    Ok(LineRead::Line(buffer))
}
