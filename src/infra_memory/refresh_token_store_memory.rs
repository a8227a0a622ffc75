use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// Process-local session store. Each key lives in one shard, so operations on
/// the same id serialize while distinct ids proceed in parallel.
#[derive(Default)]
pub struct MemoryRefreshTokenStore {
    sessions: DashMap<RefreshTokenId, RefreshTokenRecord>,
}

impl MemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait::async_trait]
impl RefreshTokenStore for MemoryRefreshTokenStore {
    async fn put(
        &self,
        id: &RefreshTokenId,
        record: &RefreshTokenRecord,
    ) -> Result<(), AuthError> {
        self.sessions.insert(id.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, id: &RefreshTokenId) -> Result<Option<RefreshTokenRecord>, AuthError> {
        Ok(self.sessions.get(id).map(|entry| entry.value().clone()))
    }

    async fn delete(&self, id: &RefreshTokenId) -> Result<u64, AuthError> {
        Ok(self.sessions.remove(id).map_or(0, |_| 1))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let mut removed = 0;
        self.sessions.retain(|_, record| {
            if record.is_expired(now) {
                removed += 1;
                false
            } else {
                true
            }
        });
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::Arc;

    fn record(user: &str, expires_at: DateTime<Utc>) -> RefreshTokenRecord {
        RefreshTokenRecord {
            subject: Subject::new(user, Role::User),
            expires_at,
        }
    }

    #[tokio::test]
    async fn put_get_delete() {
        let store = MemoryRefreshTokenStore::new();
        let id = RefreshTokenId::from("session-1");
        let rec = record("232345", Utc::now() + Duration::days(1));

        store.put(&id, &rec).await.unwrap();
        assert_eq!(store.get(&id).await.unwrap(), Some(rec));

        assert_eq!(store.delete(&id).await.unwrap(), 1);
        assert_eq!(store.get(&id).await.unwrap(), None);
        assert_eq!(store.delete(&id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unknown_id_is_absent() {
        let store = MemoryRefreshTokenStore::new();
        let id = RefreshTokenId::from("fakeId");
        assert_eq!(store.get(&id).await.unwrap(), None);
        assert_eq!(store.delete(&id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn purge_removes_only_expired() {
        let store = MemoryRefreshTokenStore::new();
        let now = Utc::now();
        store
            .put(&"old".into(), &record("a", now - Duration::seconds(1)))
            .await
            .unwrap();
        store
            .put(&"edge".into(), &record("b", now))
            .await
            .unwrap();
        store
            .put(&"fresh".into(), &record("c", now + Duration::days(1)))
            .await
            .unwrap();

        assert_eq!(store.purge_expired(now).await.unwrap(), 1);
        assert_eq!(store.len(), 2);
        assert!(store.get(&"old".into()).await.unwrap().is_none());
        assert!(store.get(&"edge".into()).await.unwrap().is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_deletes_have_one_winner() {
        let store = Arc::new(MemoryRefreshTokenStore::new());
        let id = RefreshTokenId::from("contended");
        store
            .put(&id, &record("232345", Utc::now() + Duration::days(1)))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            let id = id.clone();
            handles.push(tokio::spawn(async move { store.delete(&id).await.unwrap() }));
        }
        let mut total = 0;
        for handle in handles {
            total += handle.await.unwrap();
        }
        assert_eq!(total, 1);
        assert!(store.is_empty());
    }
}
