//! JSONL request dispatch.
//!
//! This module reads requests from connected clients, answers them through
//! the [`Dispatcher`], and writes one response line per request line. The
//! dispatcher integrates with the transport layer via the
//! `ConnectionHandler` trait.
//!
//! ## Invocation order
//!
//! `invoke_method` resolves, in order: the method name, the JSON arguments,
//! the context id, and finally the calling convention. The first step that
//! fails decides the reported error, so an unknown method with malformed
//! arguments reports `Method not found`, and malformed arguments with an
//! unknown context report `Invalid JSON arguments`.

mod dispatcher;
mod errors;
mod handler;
mod request;
mod response;

pub use self::dispatcher::{DispatchOptions, Dispatcher};
pub use self::errors::DispatchError;
pub use self::handler::DispatchConnectionHandler;

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
