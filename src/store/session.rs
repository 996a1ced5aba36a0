//! Session registry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A chat session record.
///
/// `created_at` is stamped once at creation (RFC 3339) and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: u64,
    pub session_user: String,
    pub created_at: String,
}

/// Thread-safe registry of sessions.
///
/// Cheap to clone; all clones share the same underlying state. Lookup and
/// deletion are linear scans over an insertion-ordered list, which is fine
/// at the scale this service runs at.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

#[derive(Debug)]
struct SessionStoreInner {
    sessions: RwLock<Vec<Session>>,
    /// Monotonic id source. Deletion never decrements it, so a deleted
    /// session's id is never handed out again.
    next_id: AtomicU64,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Create an empty session store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SessionStoreInner {
                sessions: RwLock::new(Vec::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Create a session for the given (already normalized) user and return it.
    ///
    /// Id assignment and insertion happen as one step, so concurrent creates
    /// can never mint the same id.
    pub fn create(&self, session_user: impl Into<String>) -> Session {
        let session = Session {
            session_id: self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            session_user: session_user.into(),
            created_at: Utc::now().to_rfc3339(),
        };
        let mut guard = self.inner.sessions.write().unwrap();
        guard.push(session.clone());
        session
    }

    /// True iff a session with this exact id exists.
    #[must_use]
    pub fn is_valid(&self, session_id: u64) -> bool {
        let guard = self.inner.sessions.read().unwrap();
        guard.iter().any(|s| s.session_id == session_id)
    }

    /// Get a session by id.
    #[must_use]
    pub fn get(&self, session_id: u64) -> Option<Session> {
        let guard = self.inner.sessions.read().unwrap();
        guard.iter().find(|s| s.session_id == session_id).cloned()
    }

    /// Insertion-order snapshot of all sessions.
    #[must_use]
    pub fn get_all(&self) -> Vec<Session> {
        self.inner.sessions.read().unwrap().clone()
    }

    /// The earliest-created session, or `None` when the store is empty.
    #[must_use]
    pub fn get_first(&self) -> Option<Session> {
        self.inner.sessions.read().unwrap().first().cloned()
    }

    /// Append a session as-is, without any id collision check.
    ///
    /// Callers that want store-assigned ids use [`SessionStore::create`];
    /// this exists for seeding sessions with specific ids.
    pub fn add(&self, session: Session) {
        let mut guard = self.inner.sessions.write().unwrap();
        guard.push(session);
    }

    /// Remove every session with this id (normally at most one).
    ///
    /// Idempotent: returns `true` whether or not anything was removed. The
    /// id counter is left untouched.
    pub fn delete(&self, session_id: u64) -> bool {
        let mut guard = self.inner.sessions.write().unwrap();
        guard.retain(|s| s.session_id != session_id);
        true
    }

    /// Empty the store and reset the id counter. Test isolation hook.
    pub fn clear(&self) {
        let mut guard = self.inner.sessions.write().unwrap();
        guard.clear();
        drop(guard);
        self.inner.next_id.store(0, Ordering::Relaxed);
    }

    /// Current number of sessions.
    #[must_use]
    pub fn count(&self) -> usize {
        self.inner.sessions.read().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(session_id: u64, session_user: &str) -> Session {
        Session {
            session_id,
            session_user: session_user.to_string(),
            created_at: Utc::now().to_rfc3339(),
        }
    }

    #[test]
    fn test_create_assigns_sequential_ids() {
        let store = SessionStore::new();

        let first = store.create("alice");
        let second = store.create("bob");
        let third = store.create("carol");

        assert_eq!(first.session_id, 1);
        assert_eq!(second.session_id, 2);
        assert_eq!(third.session_id, 3);
        assert_eq!(store.count(), 3);
    }

    #[test]
    fn test_created_id_matches_count_plus_one() {
        let store = SessionStore::new();

        for expected in 1..=5u64 {
            let before = store.count() as u64;
            let session = store.create("alice");
            assert_eq!(session.session_id, before + 1);
            assert_eq!(session.session_id, expected);
        }
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let store = SessionStore::new();

        let first = store.create("alice");
        assert!(store.delete(first.session_id));

        let second = store.create("bob");
        assert_eq!(second.session_id, 2);
        assert!(!store.is_valid(first.session_id));
    }

    #[test]
    fn test_is_valid() {
        let store = SessionStore::new();
        store.add(seeded(1001, "test_user"));

        assert!(store.is_valid(1001));
        assert!(!store.is_valid(9999));
    }

    #[test]
    fn test_get_returns_none_for_missing_session() {
        let store = SessionStore::new();
        assert!(store.get(1001).is_none());

        store.add(seeded(1001, "test_user"));
        let session = store.get(1001).unwrap();
        assert_eq!(session.session_user, "test_user");
    }

    #[test]
    fn test_get_all_preserves_insertion_order() {
        let store = SessionStore::new();
        store.add(seeded(1003, "carol"));
        store.add(seeded(1001, "alice"));
        store.add(seeded(1002, "bob"));

        let ids: Vec<u64> = store.get_all().iter().map(|s| s.session_id).collect();
        assert_eq!(ids, vec![1003, 1001, 1002]);
    }

    #[test]
    fn test_get_first() {
        let store = SessionStore::new();
        assert!(store.get_first().is_none());

        store.add(seeded(1002, "bob"));
        store.add(seeded(1001, "alice"));
        assert_eq!(store.get_first().unwrap().session_id, 1002);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let store = SessionStore::new();
        store.add(seeded(1001, "test_user"));

        assert!(store.delete(1001));
        assert!(store.delete(1001));
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_clear_resets_id_assignment() {
        let store = SessionStore::new();
        store.create("alice");
        store.create("bob");

        store.clear();
        assert_eq!(store.count(), 0);

        let session = store.create("carol");
        assert_eq!(session.session_id, 1);
    }
}
