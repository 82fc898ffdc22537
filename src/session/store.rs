//! Upload session handles and the in-memory session store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::state::{SessionSnapshot, UploadSession};

/// Handle to one upload session.
///
/// Cheap to clone; all clones share the same state.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    id: String,
    state: Mutex<UploadSession>,
    last_activity: RwLock<DateTime<Utc>>,
}

impl Session {
    fn new(id: String) -> Self {
        let now = Utc::now();
        Self {
            inner: Arc::new(SessionInner {
                id,
                state: Mutex::new(UploadSession::new()),
                last_activity: RwLock::new(now),
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Run `f` against the session state.
    ///
    /// The lock is released before this returns, so never call it across an
    /// `.await`.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut UploadSession) -> R) -> R {
        let result = {
            let mut guard = self
                .inner
                .state
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            f(&mut guard)
        };
        self.touch();
        result
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot()
    }

    fn touch(&self) {
        let mut guard = self
            .inner
            .last_activity
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Utc::now();
    }

    /// Check if the session has been idle longer than `timeout`.
    ///
    /// Sessions with a request in flight never expire.
    #[must_use]
    pub fn is_expired_with_timeout(&self, timeout: Duration) -> bool {
        let busy = {
            let state = self
                .inner
                .state
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            state.is_extracting() || state.is_downloading()
        };
        if busy {
            return false;
        }

        let last = *self
            .inner
            .last_activity
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        // Negative duration means clock skew; treat as fresh.
        (Utc::now() - last)
            .to_std()
            .is_ok_and(|idle| idle > timeout)
    }
}

/// Thread-safe store for upload sessions.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

#[derive(Debug)]
struct SessionStoreInner {
    sessions: RwLock<HashMap<String, Session>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SessionStoreInner {
                sessions: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Create a new session with a random ID.
    #[must_use]
    pub fn create(&self) -> Session {
        self.create_with_id(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn create_with_id(&self, id: impl Into<String>) -> Session {
        let id = id.into();
        let session = Session::new(id.clone());
        self.write().insert(id, session.clone());
        session
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<Session> {
        self.read().get(id).cloned()
    }

    /// Look up a session, creating a fresh one when the ID is unknown or empty.
    ///
    /// Unknown IDs are typically sessions the sweeper already removed.
    #[must_use]
    pub fn get_or_create(&self, id: &str) -> Session {
        if id.trim().is_empty() {
            return self.create();
        }
        if let Some(session) = self.get(id) {
            return session;
        }
        let mut guard = self.write();
        guard
            .entry(id.to_string())
            .or_insert_with(|| Session::new(id.to_string()))
            .clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove sessions that have been inactive longer than the timeout.
    ///
    /// Returns the number of sessions removed.
    pub fn cleanup_expired_with_timeout(&self, timeout: Duration) -> usize {
        let mut guard = self.write();
        let before = guard.len();
        guard.retain(|_, session| !session.is_expired_with_timeout(timeout));
        before - guard.len()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Session>> {
        self.inner
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Session>> {
        self.inner
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::UploadedFile;

    #[test]
    fn test_session_store() {
        let store = SessionStore::new();
        assert!(store.is_empty());

        let session = store.create();
        assert_eq!(store.len(), 1);

        let retrieved = store.get(session.id()).unwrap();
        assert_eq!(retrieved.id(), session.id());
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let store = SessionStore::new();
        let session = store.create();
        let other = store.get(session.id()).unwrap();

        session.with_state(|s| s.select_file(UploadedFile::new("a.pdf", None, b"x".to_vec())));
        let file = other.with_state(|s| s.begin_extraction()).unwrap();
        assert_eq!(file.file_name, "a.pdf");
        assert!(session.snapshot().extracting);
    }

    #[test]
    fn test_get_or_create() {
        let store = SessionStore::new();

        let fresh = store.get_or_create("");
        assert!(!fresh.id().is_empty());

        let named = store.get_or_create("known-id");
        assert_eq!(named.id(), "known-id");
        let again = store.get_or_create("known-id");
        assert!(Arc::ptr_eq(&named.inner, &again.inner));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_cleanup_expired() {
        let store = SessionStore::new();
        let _ = store.create();
        let _ = store.create();

        assert_eq!(store.cleanup_expired_with_timeout(Duration::from_secs(60)), 0);
        assert_eq!(store.len(), 2);

        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(store.cleanup_expired_with_timeout(Duration::ZERO), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_busy_sessions_survive_cleanup() {
        let store = SessionStore::new();
        let session = store.create();
        session.with_state(|s| {
            s.select_file(UploadedFile::new("a.pdf", None, b"x".to_vec()));
            s.begin_extraction().unwrap();
        });

        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(store.cleanup_expired_with_timeout(Duration::ZERO), 0);
        assert_eq!(store.len(), 1);
    }
}
