//! Session registry.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use voxmodel::SessionId;

use crate::session::Session;

/// All live sessions, keyed by room.
///
/// The map lock is held only for lookup, insert and remove; each entry
/// carries its own mutex, so long operations on one room never block
/// another. Callers must re-check `defunct` after locking an entry: a
/// concurrent stop may have removed it between lookup and lock.
pub(crate) struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<Session>>>>,
}

impl SessionRegistry {
    pub(crate) fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub(crate) async fn get(&self, session: SessionId) -> Option<Arc<Mutex<Session>>> {
        self.sessions.read().await.get(&session).cloned()
    }

    pub(crate) async fn get_or_create(&self, session: SessionId) -> Arc<Mutex<Session>> {
        if let Some(entry) = self.get(session).await {
            return entry;
        }
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session)
            .or_insert_with(|| Arc::new(Mutex::new(Session::new())))
            .clone()
    }

    pub(crate) async fn remove(&self, session: SessionId) -> Option<Arc<Mutex<Session>>> {
        self.sessions.write().await.remove(&session)
    }

    pub(crate) async fn contains(&self, session: SessionId) -> bool {
        self.sessions.read().await.contains_key(&session)
    }

    pub(crate) async fn ids(&self) -> Vec<SessionId> {
        self.sessions.read().await.keys().copied().collect()
    }

    pub(crate) async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_or_create_reuses_entry() {
        let registry = SessionRegistry::new();
        let a = registry.get_or_create(SessionId(1)).await;
        let b = registry.get_or_create(SessionId(1)).await;
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_rooms_are_independent_entries() {
        let registry = SessionRegistry::new();
        let a = registry.get_or_create(SessionId(1)).await;
        let b = registry.get_or_create(SessionId(2)).await;
        assert!(!Arc::ptr_eq(&a, &b));

        // Holding one room's lock must not block the other room
        let _guard = a.lock().await;
        let other = registry.get(SessionId(2)).await.unwrap();
        assert!(other.try_lock().is_ok());
    }

    #[tokio::test]
    async fn test_remove() {
        let registry = SessionRegistry::new();
        registry.get_or_create(SessionId(1)).await;
        assert!(registry.contains(SessionId(1)).await);
        assert!(registry.remove(SessionId(1)).await.is_some());
        assert!(!registry.contains(SessionId(1)).await);
        assert!(registry.remove(SessionId(1)).await.is_none());
    }
}
