//! Socket listener for the harness endpoint.
//!
//! The transport module binds to the configured socket endpoint, accepts
//! connections on a background thread, and serves each connection on its own
//! worker thread. Workers are counted so shutdown can wait for open
//! connections to finish.

mod errors;
mod handler;
mod inflight;
mod listener;

pub use self::errors::ListenerError;
pub(crate) use self::handler::{ConnectionHandler, ConnectionStream};
pub(crate) use self::listener::{DrainOutcome, SocketListener};

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
