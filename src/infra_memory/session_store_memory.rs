use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);
// Caps `Instant` arithmetic; far beyond any configured token lifetime.
const MAX_TTL: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

struct Entry {
    user_id: UserId,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// In-process session store for single-node runs and tests. Expired
/// entries are evicted on access and swept from writes at most once per
/// `SWEEP_INTERVAL`.
pub struct MemorySessionStore {
    sessions: DashMap<SessionId, Entry>,
    by_user: DashMap<UserId, HashSet<SessionId>>,
    last_sweep: Mutex<Instant>,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        MemorySessionStore {
            sessions: DashMap::new(),
            by_user: DashMap::new(),
            last_sweep: Mutex::new(Instant::now()),
        }
    }
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live sessions across all users.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.sessions.iter().filter(|e| e.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&self, record: &SessionRecord) {
        let now = Instant::now();
        self.maybe_sweep(now);

        let ttl = Duration::from_secs(record.ttl_secs).min(MAX_TTL);
        let entry = Entry {
            user_id: record.user_id,
            expires_at: now + ttl,
        };
        if let Some(prev) = self.sessions.insert(record.session_id, entry) {
            if prev.user_id != record.user_id {
                self.unindex(prev.user_id, &record.session_id);
            }
        }
        self.by_user
            .entry(record.user_id)
            .or_default()
            .insert(record.session_id);
    }

    fn remove(&self, session_id: &SessionId) -> u64 {
        match self.sessions.remove(session_id) {
            Some((_, entry)) => {
                self.unindex(entry.user_id, session_id);
                u64::from(entry.is_live(Instant::now()))
            }
            None => 0,
        }
    }

    fn unindex(&self, user_id: UserId, session_id: &SessionId) {
        if let Some(mut ids) = self.by_user.get_mut(&user_id) {
            ids.remove(session_id);
        }
        self.by_user.remove_if(&user_id, |_, ids| ids.is_empty());
    }

    fn maybe_sweep(&self, now: Instant) {
        let Ok(mut last) = self.last_sweep.try_lock() else {
            return;
        };
        if now.duration_since(*last) < SWEEP_INTERVAL {
            return;
        }
        *last = now;
        drop(last);

        self.sessions.retain(|_, e| e.is_live(now));
        self.by_user.retain(|user_id, ids| {
            ids.retain(|id| {
                self.sessions
                    .get(id)
                    .is_some_and(|e| e.user_id == *user_id)
            });
            !ids.is_empty()
        });
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn put(&self, record: &SessionRecord) -> Result<(), StoreError> {
        self.insert(record);
        Ok(())
    }

    async fn get(&self, session_id: &SessionId) -> Result<Option<UserId>, StoreError> {
        let now = Instant::now();
        let found = self
            .sessions
            .get(session_id)
            .map(|e| (e.user_id, e.is_live(now)));
        match found {
            Some((user_id, true)) => Ok(Some(user_id)),
            Some((_, false)) => {
                if let Some((_, entry)) =
                    self.sessions.remove_if(session_id, |_, e| !e.is_live(now))
                {
                    self.unindex(entry.user_id, session_id);
                }
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, session_id: &SessionId) -> Result<u64, StoreError> {
        Ok(self.remove(session_id))
    }

    async fn delete_user(&self, user_id: UserId) -> Result<u64, StoreError> {
        let Some((_, ids)) = self.by_user.remove(&user_id) else {
            return Ok(0);
        };
        let now = Instant::now();
        let mut deleted = 0;
        for id in ids {
            // The id may have been overwritten for another user since.
            if let Some((_, entry)) = self.sessions.remove_if(&id, |_, e| e.user_id == user_id) {
                deleted += u64::from(entry.is_live(now));
            }
        }
        Ok(deleted)
    }

    async fn swap(&self, old: &SessionId, fresh: &[SessionRecord]) -> Result<bool, SwapError> {
        // No suspension point between the removal and the inserts.
        if self.remove(old) == 0 {
            return Ok(false);
        }
        for record in fresh {
            self.insert(record);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(user: u64, ttl_secs: u64) -> SessionRecord {
        SessionRecord {
            session_id: SessionId::generate(),
            user_id: UserId(user),
            ttl_secs,
        }
    }

    #[tokio::test]
    async fn set_get_delete() {
        let store = MemorySessionStore::new();
        let rec = record(1, 60);
        store.put(&rec).await.unwrap();

        assert_eq!(store.get(&rec.session_id).await.unwrap(), Some(UserId(1)));
        assert_eq!(store.delete(&rec.session_id).await.unwrap(), 1);
        assert_eq!(store.get(&rec.session_id).await.unwrap(), None);
        assert_eq!(store.delete(&rec.session_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn put_overwrites_same_key() {
        let store = MemorySessionStore::new();
        let mut rec = record(1, 60);
        store.put(&rec).await.unwrap();
        rec.user_id = UserId(2);
        store.put(&rec).await.unwrap();

        assert_eq!(store.get(&rec.session_id).await.unwrap(), Some(UserId(2)));
        assert_eq!(store.len(), 1);
        // The stale index entry for user 1 must not remove user 2's session.
        assert_eq!(store.delete_user(UserId(1)).await.unwrap(), 0);
        assert_eq!(store.get(&rec.session_id).await.unwrap(), Some(UserId(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let store = MemorySessionStore::new();
        let short = record(1, 60);
        let long = record(1, 3600);
        store.put(&short).await.unwrap();
        store.put(&long).await.unwrap();

        tokio::time::advance(Duration::from_secs(61)).await;

        assert_eq!(store.get(&short.session_id).await.unwrap(), None);
        assert_eq!(store.get(&long.session_id).await.unwrap(), Some(UserId(1)));
        assert_eq!(store.delete(&short.session_id).await.unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_old_session_cannot_be_swapped() {
        let store = MemorySessionStore::new();
        let old = record(1, 10);
        store.put(&old).await.unwrap();
        tokio::time::advance(Duration::from_secs(11)).await;

        let fresh = [record(1, 60)];
        assert!(!store.swap(&old.session_id, &fresh).await.unwrap());
        assert_eq!(store.get(&fresh[0].session_id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn swap_replaces_old_with_fresh() {
        let store = MemorySessionStore::new();
        let old = record(1, 60);
        store.put(&old).await.unwrap();

        let fresh = [record(1, 60), record(1, 600)];
        assert!(store.swap(&old.session_id, &fresh).await.unwrap());
        assert_eq!(store.get(&old.session_id).await.unwrap(), None);
        for rec in &fresh {
            assert_eq!(store.get(&rec.session_id).await.unwrap(), Some(UserId(1)));
        }
        assert!(!store.swap(&old.session_id, &fresh).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn writes_sweep_expired_entries() {
        let store = MemorySessionStore::new();
        for _ in 0..1000 {
            store.put(&record(1, 60)).await.unwrap();
        }
        tokio::time::advance(Duration::from_secs(3600)).await;

        let fresh = record(2, 60);
        store.put(&fresh).await.unwrap();

        assert_eq!(store.sessions.len(), 1);
        assert_eq!(store.by_user.len(), 1);
        assert_eq!(store.by_user.get(&UserId(2)).unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_waits_for_interval() {
        let store = MemorySessionStore::new();
        store.put(&record(1, 10)).await.unwrap();
        tokio::time::advance(Duration::from_secs(20)).await;
        store.put(&record(1, 60)).await.unwrap();

        // Expired but not yet swept; it no longer counts as live.
        assert_eq!(store.sessions.len(), 2);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_get_drops_index_entry() {
        let store = MemorySessionStore::new();
        let rec = record(1, 10);
        store.put(&rec).await.unwrap();
        tokio::time::advance(Duration::from_secs(11)).await;

        assert_eq!(store.get(&rec.session_id).await.unwrap(), None);
        assert!(store.sessions.is_empty());
        assert!(store.by_user.is_empty());
    }

    #[tokio::test]
    async fn delete_drops_empty_index() {
        let store = MemorySessionStore::new();
        let rec = record(1, 60);
        store.put(&rec).await.unwrap();
        store.delete(&rec.session_id).await.unwrap();
        assert!(store.by_user.is_empty());
    }

    #[tokio::test]
    async fn huge_ttl_is_capped_not_panicking() {
        let store = MemorySessionStore::new();
        let rec = record(1, u64::MAX);
        store.put(&rec).await.unwrap();
        assert_eq!(store.get(&rec.session_id).await.unwrap(), Some(UserId(1)));
    }

    #[tokio::test]
    async fn delete_user_leaves_other_users() {
        let store = MemorySessionStore::new();
        let mine = [record(1, 60), record(1, 60)];
        let theirs = record(2, 60);
        for rec in mine.iter().chain([&theirs]) {
            store.put(rec).await.unwrap();
        }

        assert_eq!(store.delete_user(UserId(1)).await.unwrap(), 2);
        assert_eq!(store.get(&theirs.session_id).await.unwrap(), Some(UserId(2)));
        assert_eq!(store.len(), 1);
    }
}
