//! In-memory storage collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use super::{KeyValueStore, RecordStore, StoreError, StoreResult};
use crate::session::{Session, SessionClose, SessionId};

/// Thread-safe record store held in process memory.
///
/// Ids are random UUIDs. The store can be switched offline to exercise
/// failure paths: every call then fails with [`StoreError::Rejected`].
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    sessions: RwLock<HashMap<SessionId, Session>>,
    offline: AtomicBool,
    creates: AtomicUsize,
    updates: AtomicUsize,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records.
    pub fn with_sessions(sessions: impl IntoIterator<Item = Session>) -> Self {
        let store = Self::new();
        if let Ok(mut map) = store.sessions.write() {
            map.extend(sessions.into_iter().map(|s| (s.id.clone(), s)));
        }
        store
    }

    /// Make every subsequent call fail (or succeed again).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Get a clone of the session with the given ID.
    pub fn get(&self, id: &SessionId) -> StoreResult<Option<Session>> {
        let sessions = self.sessions.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(sessions.get(id).cloned())
    }

    /// Remove a session, as an out-of-band deletion would.
    pub fn remove(&self, id: &SessionId) -> StoreResult<Option<Session>> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        Ok(sessions.remove(id))
    }

    /// Get the number of sessions in the store.
    pub fn count(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    /// Number of sessions with no end time.
    pub fn open_count(&self) -> usize {
        self.sessions
            .read()
            .map(|s| s.values().filter(|session| session.is_open()).count())
            .unwrap_or(0)
    }

    /// Number of `create` calls received, including failed ones.
    pub fn create_calls(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    /// Number of `update` calls received, including failed ones.
    pub fn update_calls(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::Rejected {
                status: 503,
                message: "record store offline".into(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn create(&self, user_id: Option<&str>) -> StoreResult<SessionId> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;

        let id = SessionId::new(uuid::Uuid::new_v4().to_string());
        let session = Session::open(id.clone(), user_id.map(str::to_string));

        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        sessions.insert(id.clone(), session);
        Ok(id)
    }

    async fn update(&self, id: &SessionId, close: &SessionClose) -> StoreResult<()> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;

        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if !session.is_open() {
            return Err(StoreError::AlreadyClosed(id.to_string()));
        }
        session.close(close);
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<Session>> {
        self.check_online()?;

        let sessions = self.sessions.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut list: Vec<Session> = sessions.values().cloned().collect();
        list.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(list)
    }
}

/// Key-value store held in process memory.
///
/// Survives nothing; used to stand in for device storage in tests.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    values: RwLock<HashMap<String, String>>,
    unreadable: AtomicBool,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a single key.
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut values) = store.values.write() {
            values.insert(key.to_string(), value.to_string());
        }
        store
    }

    /// Make reads fail, as a corrupt backing file would.
    pub fn set_unreadable(&self, unreadable: bool) {
        self.unreadable.store(unreadable, Ordering::SeqCst);
    }

    /// Synchronous peek, for assertions.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.values.read().ok()?.get(key).cloned()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        if self.unreadable.load(Ordering::SeqCst) {
            return Err(StoreError::Malformed("store unreadable".into()));
        }
        let values = self.values.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut values = self.values.write().map_err(|_| StoreError::LockPoisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        let mut values = self.values.write().map_err(|_| StoreError::LockPoisoned)?;
        values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::CloseAmounts;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_create_session() {
        let store = MemoryRecordStore::new();
        let id = store.create(Some("me")).await.unwrap();

        let session = store.get(&id).unwrap().unwrap();
        assert!(session.is_open());
        assert_eq!(session.user_id.as_deref(), Some("me"));
        assert_eq!(store.count(), 1);
        assert_eq!(store.open_count(), 1);
    }

    #[tokio::test]
    async fn test_update_session() {
        let store = MemoryRecordStore::new();
        let id = store.create(None).await.unwrap();

        let close = SessionClose::now(CloseAmounts::new(100, 250).unwrap());
        store.update(&id, &close).await.unwrap();

        let session = store.get(&id).unwrap().unwrap();
        assert!(!session.is_open());
        assert_eq!(session.balance(), 150);
        assert_eq!(store.open_count(), 0);
        assert_eq!(store.update_calls(), 1);
    }

    #[tokio::test]
    async fn test_update_nonexistent() {
        let store = MemoryRecordStore::new();
        let close = SessionClose::now(CloseAmounts::new(0, 0).unwrap());

        let result = store.update(&SessionId::new("missing"), &close).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_closed_session_rejected() {
        let store = MemoryRecordStore::new();
        let id = store.create(None).await.unwrap();
        let first = SessionClose::now(CloseAmounts::new(100, 200).unwrap());
        store.update(&id, &first).await.unwrap();

        let second = SessionClose::now(CloseAmounts::new(999, 0).unwrap());
        let result = store.update(&id, &second).await;
        assert!(matches!(result, Err(StoreError::AlreadyClosed(ref s)) if s == id.as_str()));

        let session = store.get(&id).unwrap().unwrap();
        assert_eq!(session.investment, Some(100));
        assert_eq!(session.recovery, Some(200));
        assert_eq!(session.end_time, Some(first.end_time));
        assert_eq!(store.update_calls(), 2);
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let now = Utc::now();
        let store = MemoryRecordStore::with_sessions([
            Session::open_at(SessionId::new("old"), None, now - Duration::hours(2)),
            Session::open_at(SessionId::new("new"), None, now),
            Session::open_at(SessionId::new("mid"), None, now - Duration::hours(1)),
        ]);

        let ids: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id.into_inner())
            .collect();
        assert_eq!(ids, ["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn test_offline_fails_every_call() {
        let store = MemoryRecordStore::new();
        store.set_offline(true);

        assert!(store.create(None).await.is_err());
        assert!(store.list().await.is_err());
        assert_eq!(store.count(), 0);
        assert_eq!(store.create_calls(), 1);

        store.set_offline(false);
        assert!(store.create(None).await.is_ok());
    }

    #[tokio::test]
    async fn test_kv_roundtrip() {
        let kv = MemoryKeyValueStore::new();
        assert_eq!(kv.get("k").await.unwrap(), None);

        kv.set("k", "v").await.unwrap();
        assert_eq!(kv.get("k").await.unwrap(), Some("v".into()));

        kv.remove("k").await.unwrap();
        assert_eq!(kv.get("k").await.unwrap(), None);

        // Removing again is fine
        kv.remove("k").await.unwrap();
    }

    #[tokio::test]
    async fn test_kv_unreadable() {
        let kv = MemoryKeyValueStore::with_value("k", "v");
        kv.set_unreadable(true);
        assert!(kv.get("k").await.is_err());
        assert_eq!(kv.peek("k"), Some("v".into()));
    }
}
