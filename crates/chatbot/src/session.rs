use dashmap::DashMap;
use llm::ChatSession;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::prompt::{ACKNOWLEDGEMENT, SYSTEM_PROMPT};

/// Session used by callers that do not send a session id.
pub const DEFAULT_SESSION: &str = "default";

/// Chat sessions keyed by client-supplied id, created on first use.
///
/// Holds at most `max_sessions` entries. When full, a quarter of the
/// non-default sessions are dropped before a new one is created.
pub struct SessionStore {
    sessions: DashMap<String, Arc<Mutex<ChatSession>>>,
    max_exchanges: usize,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(max_exchanges: usize, max_sessions: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            max_exchanges,
            max_sessions: max_sessions.max(1),
        }
    }

    pub fn get(&self, session_id: Option<&str>) -> Arc<Mutex<ChatSession>> {
        let key = session_id
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SESSION);

        if !self.sessions.contains_key(key) && self.sessions.len() >= self.max_sessions {
            self.evict();
        }

        // Clone out of the shard guard before anyone awaits on the session.
        self.sessions
            .entry(key.to_string())
            .or_insert_with(|| {
                Arc::new(Mutex::new(ChatSession::new(
                    SYSTEM_PROMPT,
                    ACKNOWLEDGEMENT,
                    self.max_exchanges,
                )))
            })
            .value()
            .clone()
    }

    // Simple eviction: clear 25% when full, never the default session
    fn evict(&self) {
        let to_remove: Vec<String> = self
            .sessions
            .iter()
            .filter(|entry| entry.key() != DEFAULT_SESSION)
            .take((self.max_sessions / 4).max(1))
            .map(|entry| entry.key().clone())
            .collect();

        for key in &to_remove {
            self.sessions.remove(key);
        }

        debug!(evicted = to_remove.len(), remaining = self.sessions.len(), "Evicted chat sessions");
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_and_blank_ids_share_default() {
        let store = SessionStore::new(10, 100);

        let a = store.get(None);
        let b = store.get(Some("  "));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_distinct_ids_get_distinct_sessions() {
        let store = SessionStore::new(10, 100);

        let a = store.get(Some("alice"));
        let b = store.get(Some("bob"));
        assert!(!Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a, &store.get(Some("alice"))));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_store_stays_within_bound() {
        let store = SessionStore::new(10, 8);
        let default = store.get(None);

        for i in 0..10_000 {
            let id = format!("client-{}", i);
            store.get(Some(id.as_str()));
            assert!(store.len() <= 8, "store grew to {}", store.len());
        }

        // The default session survives every eviction round.
        assert!(Arc::ptr_eq(&default, &store.get(None)));
        assert!(store.len() <= 8);
    }

    #[test]
    fn test_existing_session_is_not_evicted_on_lookup() {
        let store = SessionStore::new(10, 2);

        let a = store.get(Some("alice"));
        store.get(Some("bob"));
        assert!(Arc::ptr_eq(&a, &store.get(Some("alice"))));
        assert_eq!(store.len(), 2);
    }
}
