//! Execution contexts: isolated, named state maps owned by the server.
//!
//! Each session owns a JSON object map and lives until it is explicitly
//! destroyed. Sessions are shared as `Arc<Session>` so an invocation that
//! looked a session up keeps operating on it even if another client destroys
//! it concurrently; the destroyed id simply stops resolving for later
//! requests.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::value::decode_object;

const SESSION_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::session");

/// Opaque session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrowed textual form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SessionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

/// Errors raised by the session store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// No live session carries the id.
    #[error("Context not found: {id}")]
    NotFound {
        /// The id that failed to resolve.
        id: String,
    },
}

/// A named state map.
///
/// Reads and writes go through an internal lock, so a callable may hold a
/// `&Session` while other requests read the same session.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    state: RwLock<Map<String, Value>>,
}

impl Session {
    fn new(id: SessionId, state: Map<String, Value>) -> Self {
        Self {
            id,
            state: RwLock::new(state),
        }
    }

    /// A session that belongs to no store.
    ///
    /// Used for stateful calls made without a context: the callable gets a
    /// scratch map that disappears with the call.
    #[must_use]
    pub fn detached() -> Self {
        Self::new(SessionId::generate(), Map::new())
    }

    /// The session id.
    #[must_use]
    pub const fn id(&self) -> &SessionId {
        &self.id
    }

    /// Returns a copy of the value under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.get(key).cloned()
    }

    /// Returns the value under `key`, or `fallback` when absent.
    #[must_use]
    pub fn get_or(&self, key: &str, fallback: Value) -> Value {
        self.get(key).unwrap_or(fallback)
    }

    /// Stores `value` under `key`, returning the previous value.
    pub fn set(&self, key: &str, value: Value) -> Option<Value> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.insert(key.to_owned(), value)
    }

    /// Removes `key`, returning its value.
    pub fn remove(&self, key: &str) -> Option<Value> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.remove(key)
    }

    /// Applies `update` to the state map under the write lock.
    pub fn update<R>(&self, update: impl FnOnce(&mut Map<String, Value>) -> R) -> R {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        update(&mut state)
    }

    /// Copies the whole state map.
    #[must_use]
    pub fn snapshot(&self) -> Map<String, Value> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Renders the state map as JSON object text.
    #[must_use]
    pub fn to_json(&self) -> String {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Value::Object(state.clone()).to_string()
    }
}

/// Concurrent store of live sessions.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, Arc<Session>>>,
}

impl SessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session, optionally seeded from JSON object text.
    ///
    /// A seed that is not a JSON object is logged and ignored; the session
    /// then starts empty. Creation never fails.
    pub fn create(&self, initial_state: Option<&str>) -> Arc<Session> {
        let state = initial_state
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map_or_else(Map::new, seed_state);

        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let id = loop {
            let candidate = SessionId::generate();
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
        };
        let session = Arc::new(Session::new(id.clone(), state));
        sessions.insert(id, Arc::clone(&session));
        debug!(
            target: SESSION_TARGET,
            context_id = %session.id(),
            live = sessions.len(),
            "context created"
        );
        session
    }

    /// Resolves a live session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotFound`] when no live session has the id.
    pub fn get(&self, id: &str) -> Result<Arc<Session>, SessionError> {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        sessions.get(id).cloned().ok_or_else(|| SessionError::NotFound {
            id: id.to_owned(),
        })
    }

    /// Stores `value` under `key` in a live session, returning the previous
    /// value.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotFound`] when no live session has the id.
    pub fn update(
        &self,
        id: &str,
        key: &str,
        value: Value,
    ) -> Result<Option<Value>, SessionError> {
        self.get(id).map(|session| session.set(key, value))
    }

    /// Applies `update` to a live session's state map under its write lock.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotFound`] when no live session has the id.
    pub fn update_with<R>(
        &self,
        id: &str,
        update: impl FnOnce(&mut Map<String, Value>) -> R,
    ) -> Result<R, SessionError> {
        self.get(id).map(|session| session.update(update))
    }

    /// Returns a live session's state as JSON object text.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotFound`] when no live session has the id.
    pub fn inspect(&self, id: &str) -> Result<String, SessionError> {
        self.get(id).map(|session| session.to_json())
    }

    /// Destroys a session. Its id never resolves again.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotFound`] when no live session has the id,
    /// including a second destroy of the same id.
    pub fn destroy(&self, id: &str) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        match sessions.remove(id) {
            Some(_) => {
                debug!(
                    target: SESSION_TARGET,
                    context_id = id,
                    live = sessions.len(),
                    "context destroyed"
                );
                Ok(())
            }
            None => Err(SessionError::NotFound { id: id.to_owned() }),
        }
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no session is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn seed_state(text: &str) -> Map<String, Value> {
    decode_object(text).unwrap_or_else(|error| {
        warn!(
            target: SESSION_TARGET,
            %error,
            "ignoring malformed initial state"
        );
        Map::new()
    })
}
