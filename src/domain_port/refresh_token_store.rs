use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

#[async_trait::async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Persist a session. Fails only on a storage fault.
    async fn put(&self, id: &RefreshTokenId, record: &RefreshTokenRecord)
    -> Result<(), AuthError>;

    /// Never-issued, deleted and evicted ids are all reported as `None`.
    async fn get(&self, id: &RefreshTokenId) -> Result<Option<RefreshTokenRecord>, AuthError>;

    /// Returns how many entries were removed (0 or 1).
    async fn delete(&self, id: &RefreshTokenId) -> Result<u64, AuthError>;

    /// Drop every record whose `expires_at` is before `now`.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError>;
}

/// Storage key for persistent backends: the raw handle is never written out.
pub fn refresh_id_digest(id: &RefreshTokenId) -> String {
    hex::encode(Sha256::digest(id.as_str().as_bytes()))
}
