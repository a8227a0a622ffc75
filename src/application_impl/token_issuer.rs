use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use chrono::{DateTime, Duration, Utc};
use std::future::Future;
use std::sync::Arc;

/// Bound a store call by `timeout`. An elapsed deadline is a storage fault.
pub(crate) async fn store_call<T, F>(
    timeout: std::time::Duration,
    op: &'static str,
    fut: F,
) -> Result<T, AuthError>
where
    F: Future<Output = Result<T, AuthError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(AuthError::Store(format!("{op} timed out after {timeout:?}"))),
    }
}

pub struct TokenIssuer {
    codec: Arc<dyn TokenCodec>,
    store: Arc<dyn RefreshTokenStore>,
    refresh_ttl: Duration,
    store_timeout: std::time::Duration,
}

impl TokenIssuer {
    pub fn new(
        codec: Arc<dyn TokenCodec>,
        store: Arc<dyn RefreshTokenStore>,
        refresh_ttl: Duration,
        store_timeout: std::time::Duration,
    ) -> Self {
        Self {
            codec,
            store,
            refresh_ttl,
            store_timeout,
        }
    }

    pub async fn issue(&self, subject: &Subject, now: DateTime<Utc>) -> Result<Token, AuthError> {
        let access_token = self.codec.encode(subject, now)?;
        let refresh_token_id = self.codec.new_refresh_id();
        let record = RefreshTokenRecord {
            subject: subject.clone(),
            expires_at: now + self.refresh_ttl,
        };

        store_call(
            self.store_timeout,
            "put refresh token",
            self.store.put(&refresh_token_id, &record),
        )
        .await?;

        debug!(user_id = %subject.user_id, role = %subject.role, "issued token pair");
        Ok(Token {
            access_token,
            refresh_token_id,
        })
    }

    pub async fn reissue_access_token(
        &self,
        refresh_id: &RefreshTokenId,
        now: DateTime<Utc>,
    ) -> Result<AccessToken, AuthError> {
        let record = store_call(
            self.store_timeout,
            "get refresh token",
            self.store.get(refresh_id),
        )
        .await?
        .ok_or(AuthError::RefreshInvalid)?;

        if record.is_expired(now) {
            let evicted = store_call(
                self.store_timeout,
                "evict refresh token",
                self.store.delete(refresh_id),
            )
            .await;
            if let Err(e) = evicted {
                warn!("evicting expired refresh token: {}", e);
            }
            return Err(AuthError::RefreshInvalid);
        }

        let access_token = self.codec.encode(&record.subject, now)?;
        debug!(user_id = %record.subject.user_id, "reissued access token");
        Ok(access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::{JwtConfig, JwtHs256Codec};
    use crate::infra_memory::MemoryRefreshTokenStore;

    struct StalledStore;

    #[async_trait::async_trait]
    impl RefreshTokenStore for StalledStore {
        async fn put(&self, _: &RefreshTokenId, _: &RefreshTokenRecord) -> Result<(), AuthError> {
            std::future::pending().await
        }
        async fn get(&self, _: &RefreshTokenId) -> Result<Option<RefreshTokenRecord>, AuthError> {
            std::future::pending().await
        }
        async fn delete(&self, _: &RefreshTokenId) -> Result<u64, AuthError> {
            std::future::pending().await
        }
        async fn purge_expired(&self, _: DateTime<Utc>) -> Result<u64, AuthError> {
            Ok(0)
        }
    }

    fn codec() -> Arc<JwtHs256Codec> {
        Arc::new(JwtHs256Codec::new(JwtConfig {
            issuer: "boardsignal.auth".to_string(),
            audience: "boardsignal-client".to_string(),
            access_ttl: Duration::minutes(30),
            signing_key: b"issuer-test-key".to_vec(),
        }))
    }

    fn issuer(store: Arc<dyn RefreshTokenStore>) -> (TokenIssuer, Arc<JwtHs256Codec>) {
        let codec = codec();
        let issuer = TokenIssuer::new(
            codec.clone(),
            store,
            Duration::days(14),
            std::time::Duration::from_millis(200),
        );
        (issuer, codec)
    }

    #[tokio::test]
    async fn issue_persists_one_session() {
        let store = Arc::new(MemoryRefreshTokenStore::new());
        let (issuer, codec) = issuer(store.clone());
        let subject = Subject::new("232345", Role::User);
        let now = Utc::now();

        let token = issuer.issue(&subject, now).await.unwrap();

        assert_eq!(store.len(), 1);
        let record = store.get(&token.refresh_token_id).await.unwrap().unwrap();
        assert_eq!(record.subject, subject);
        assert_eq!(record.expires_at, now + Duration::days(14));
        assert_eq!(codec.decode(token.access_token.as_str()).unwrap(), subject);
    }

    #[tokio::test]
    async fn reissue_yields_token_for_same_subject() {
        let store = Arc::new(MemoryRefreshTokenStore::new());
        let (issuer, codec) = issuer(store);
        let subject = Subject::new("232345", Role::Admin);

        let token = issuer.issue(&subject, Utc::now()).await.unwrap();
        let access = issuer
            .reissue_access_token(&token.refresh_token_id, Utc::now())
            .await
            .unwrap();

        assert_eq!(codec.decode(access.as_str()).unwrap(), subject);
    }

    #[tokio::test]
    async fn sessions_are_additive() {
        let store = Arc::new(MemoryRefreshTokenStore::new());
        let (issuer, _) = issuer(store.clone());
        let subject = Subject::new("232345", Role::User);

        let first = issuer.issue(&subject, Utc::now()).await.unwrap();
        let second = issuer.issue(&subject, Utc::now()).await.unwrap();

        assert_ne!(first.refresh_token_id, second.refresh_token_id);
        assert_eq!(store.len(), 2);
        for id in [&first.refresh_token_id, &second.refresh_token_id] {
            assert!(issuer.reissue_access_token(id, Utc::now()).await.is_ok());
        }
    }

    #[tokio::test]
    async fn unknown_refresh_id_is_rejected() {
        let (issuer, _) = issuer(Arc::new(MemoryRefreshTokenStore::new()));
        let result = issuer
            .reissue_access_token(&RefreshTokenId::from("fakeId"), Utc::now())
            .await;
        assert!(matches!(result, Err(AuthError::RefreshInvalid)));
    }

    #[tokio::test]
    async fn expired_refresh_id_is_rejected_and_evicted() {
        let store = Arc::new(MemoryRefreshTokenStore::new());
        let (issuer, _) = issuer(store.clone());
        let issued_at = Utc::now() - Duration::days(15);

        let token = issuer
            .issue(&Subject::new("232345", Role::User), issued_at)
            .await
            .unwrap();
        let result = issuer
            .reissue_access_token(&token.refresh_token_id, Utc::now())
            .await;

        assert!(matches!(result, Err(AuthError::RefreshInvalid)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn stalled_store_surfaces_as_store_error() {
        let (issuer, _) = issuer(Arc::new(StalledStore));
        let result = issuer
            .issue(&Subject::new("232345", Role::User), Utc::now())
            .await;
        assert!(matches!(result, Err(AuthError::Store(_))));

        let result = issuer
            .reissue_access_token(&RefreshTokenId::from("any"), Utc::now())
            .await;
        assert!(matches!(result, Err(AuthError::Store(_))));
    }
}
