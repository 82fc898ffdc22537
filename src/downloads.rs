//! One-shot download slots.
//!
//! A generated document is parked under a random token until the browser
//! fetches it. Fetching revokes the slot; unclaimed slots are dropped by the
//! sweeper once their TTL passes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::ocr::DocumentPayload;

#[derive(Debug)]
struct Slot {
    payload: DocumentPayload,
    created_at: Instant,
}

/// Thread-safe store of pending downloads.
#[derive(Debug, Clone, Default)]
pub struct DownloadStore {
    slots: Arc<Mutex<HashMap<String, Slot>>>,
}

impl DownloadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Park a document and return the token that redeems it.
    pub fn insert(&self, payload: DocumentPayload) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.lock().insert(
            token.clone(),
            Slot {
                payload,
                created_at: Instant::now(),
            },
        );
        token
    }

    /// Redeem a token. The slot is gone afterwards.
    pub fn take(&self, token: &str) -> Option<DocumentPayload> {
        self.lock().remove(token).map(|slot| slot.payload)
    }

    /// Drop slots older than `ttl`. Returns how many were dropped.
    pub fn sweep(&self, ttl: Duration) -> usize {
        let mut guard = self.lock();
        let before = guard.len();
        guard.retain(|_, slot| slot.created_at.elapsed() <= ttl);
        before - guard.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;

    fn doc() -> DocumentPayload {
        DocumentPayload {
            bytes: Bytes::from_static(b"PK\x03\x04"),
            content_type: None,
        }
    }

    #[test]
    fn test_take_is_one_shot() {
        let store = DownloadStore::new();
        let token = store.insert(doc());
        assert_eq!(store.len(), 1);

        let payload = store.take(&token).unwrap();
        assert_eq!(payload.bytes.as_ref(), b"PK\x03\x04");
        assert!(store.take(&token).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_tokens_are_unique() {
        let store = DownloadStore::new();
        let a = store.insert(doc());
        let b = store.insert(doc());
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_unknown_token() {
        assert!(DownloadStore::new().take("missing").is_none());
    }

    #[test]
    fn test_sweep_drops_stale_slots() {
        let store = DownloadStore::new();
        store.insert(doc());

        assert_eq!(store.sweep(Duration::from_secs(60)), 0);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(store.sweep(Duration::ZERO), 1);
        assert!(store.is_empty());
    }
}
