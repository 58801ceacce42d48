//! Session context shared by the fetcher and the extraction layer
//!
//! A [`Session`] replaces process-wide globals: it owns the site credential,
//! the time the last unread-message notice was shown, and the node-directory
//! cache. Every operation is a short read or replace under a lock, so the
//! session can be shared behind an `Arc` across the reply fan-out.
//!
//! The credential is an opaque cookie string. It is never parsed, only
//! forwarded as a header value and dropped when the site rejects it.

pub mod store;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{LazyLock, PoisonError, RwLock};
use thiserror::Error;

use crate::models::NodeRef;

pub use store::{JsonFileStore, MemoryStore, StateStore};

/// Users often paste the header name along with the value
static COOKIE_PREFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^cookie:\s*").unwrap());

/// Errors that can occur while loading or saving session state
#[derive(Error, Debug)]
pub enum SessionError {
    /// State file could not be read or written
    #[error("Session I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// State file is not valid JSON
    #[error("Session state is corrupt: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persisted portion of the session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Site session cookie
    #[serde(default)]
    pub credential: Option<String>,

    /// When the last unread-message notice was surfaced
    #[serde(default)]
    pub last_notice_at: Option<DateTime<Utc>>,
}

/// Explicit session context
pub struct Session {
    state: RwLock<SessionState>,
    node_cache: RwLock<Option<Vec<NodeRef>>>,
    store: Box<dyn StateStore>,
}

impl Session {
    /// Open a session backed by `store`, loading whatever it holds
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the store cannot be read
    pub fn open(store: impl StateStore + 'static) -> Result<Self, SessionError> {
        let state = store.load()?;
        Ok(Self {
            state: RwLock::new(state),
            node_cache: RwLock::new(None),
            store: Box::new(store),
        })
    }

    /// Session that is never written to disk
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            state: RwLock::new(SessionState::default()),
            node_cache: RwLock::new(None),
            store: Box::new(MemoryStore::new()),
        }
    }

    /// Current credential, if any
    pub fn credential(&self) -> Option<String> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .credential
            .clone()
    }

    pub fn has_credential(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .credential
            .is_some()
    }

    /// Replace the credential
    ///
    /// Input is normalized as pasted by a user: surrounding whitespace and a
    /// leading `Cookie:` are removed. An empty result clears the credential.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the new state cannot be persisted; the
    /// in-memory credential is updated regardless.
    pub fn set_credential(&self, value: &str) -> Result<(), SessionError> {
        let normalized = normalize_credential(value);
        self.update(|state| state.credential = normalized)
    }

    /// Forget the credential
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the new state cannot be persisted
    pub fn clear_credential(&self) -> Result<(), SessionError> {
        self.update(|state| state.credential = None)
    }

    pub fn last_notice_at(&self) -> Option<DateTime<Utc>> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last_notice_at
    }

    /// Record that an unread-message notice was shown at `at`
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the new state cannot be persisted
    pub fn record_notice(&self, at: DateTime<Utc>) -> Result<(), SessionError> {
        self.update(|state| state.last_notice_at = Some(at))
    }

    /// Cached node directory, if it was fetched before
    pub fn cached_nodes(&self) -> Option<Vec<NodeRef>> {
        self.node_cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Store the node directory for the rest of the process lifetime
    pub fn cache_nodes(&self, nodes: Vec<NodeRef>) {
        *self.node_cache.write().unwrap_or_else(PoisonError::into_inner) = Some(nodes);
    }

    fn update(&self, apply: impl FnOnce(&mut SessionState)) -> Result<(), SessionError> {
        // Saved under the write lock so the store sees updates in order
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        apply(&mut state);
        self.store.save(&state)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the credential itself
        f.debug_struct("Session")
            .field("has_credential", &self.has_credential())
            .field("last_notice_at", &self.last_notice_at())
            .finish_non_exhaustive()
    }
}

/// Trim pasted input and drop a leading `Cookie:` header name
pub fn normalize_credential(value: &str) -> Option<String> {
    let trimmed = value.trim();
    let stripped = COOKIE_PREFIX_REGEX.replace(trimmed, "");
    let stripped = stripped.trim();

    if stripped.is_empty() {
        None
    } else {
        Some(stripped.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[test]
    fn test_normalize_credential() {
        assert_eq!(normalize_credential("  A2=1; B=2 "), Some("A2=1; B=2".to_string()));
        assert_eq!(normalize_credential("Cookie: A2=1"), Some("A2=1".to_string()));
        assert_eq!(normalize_credential("cookie:A2=1"), Some("A2=1".to_string()));
        assert_eq!(normalize_credential("   "), None);
        assert_eq!(normalize_credential("Cookie: "), None);
    }

    #[test]
    fn test_set_and_clear_credential() {
        let session = Session::in_memory();
        assert!(!session.has_credential());

        session.set_credential("A2=token").unwrap();
        assert_eq!(session.credential().as_deref(), Some("A2=token"));

        session.clear_credential().unwrap();
        assert_eq!(session.credential(), None);
    }

    #[test]
    fn test_empty_credential_clears() {
        let session = Session::in_memory();
        session.set_credential("A2=token").unwrap();
        session.set_credential("").unwrap();
        assert!(!session.has_credential());
    }

    #[test]
    fn test_state_is_written_through_to_store() {
        let initial = SessionState {
            credential: Some("stale".to_string()),
            last_notice_at: None,
        };
        let session = Session::open(MemoryStore::with_state(initial)).unwrap();
        assert_eq!(session.credential().as_deref(), Some("stale"));

        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        session.record_notice(at).unwrap();
        assert_eq!(session.last_notice_at(), Some(at));
    }

    /// Store that keeps every saved state and saves slowly
    #[derive(Clone, Default)]
    struct SlowStore {
        saved: Arc<Mutex<Vec<SessionState>>>,
    }

    impl StateStore for SlowStore {
        fn load(&self) -> Result<SessionState, SessionError> {
            Ok(self.saved.lock().unwrap().last().cloned().unwrap_or_default())
        }

        fn save(&self, state: &SessionState) -> Result<(), SessionError> {
            std::thread::sleep(Duration::from_millis(5));
            self.saved.lock().unwrap().push(state.clone());
            Ok(())
        }
    }

    #[test]
    fn test_concurrent_updates_persist_in_order() {
        let store = SlowStore::default();
        let session = Arc::new(Session::open(store.clone()).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let session = Arc::clone(&session);
                std::thread::spawn(move || {
                    session.set_credential(&format!("A2=token{i}")).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let saved = store.saved.lock().unwrap();
        assert_eq!(saved.len(), 8);
        assert_eq!(saved.last().and_then(|s| s.credential.clone()), session.credential());
    }

    #[test]
    fn test_node_cache() {
        let session = Session::in_memory();
        assert!(session.cached_nodes().is_none());

        session.cache_nodes(vec![NodeRef::new("python", "Python")]);
        let cached = session.cached_nodes().unwrap();
        assert_eq!(cached, vec![NodeRef::new("python", "Python")]);
    }

    #[test]
    fn test_debug_hides_credential() {
        let session = Session::in_memory();
        session.set_credential("secret-cookie").unwrap();
        let printed = format!("{session:?}");
        assert!(!printed.contains("secret-cookie"));
    }
}
