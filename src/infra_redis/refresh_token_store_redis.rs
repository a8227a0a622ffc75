use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::{
    AsyncCommands, FromRedisValue, RedisError, RedisResult, RedisWrite, ToRedisArgs, Value,
};

/// Sessions live under `<prefix>:<sha256(id)>` with a TTL matching the record,
/// so Redis evicts them on its own.
pub struct RedisRefreshTokenStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisRefreshTokenStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        RedisRefreshTokenStore {
            conn,
            prefix: prefix.into(),
        }
    }

    fn key(&self, id: &RefreshTokenId) -> String {
        format!("{}:{}", self.prefix, refresh_id_digest(id))
    }

    fn ttl_secs(until: DateTime<Utc>) -> u64 {
        let secs = (until - Utc::now()).num_seconds();
        if secs <= 0 { 1 } else { secs as u64 }
    }
}

impl ToRedisArgs for RefreshTokenRecord {
    fn write_redis_args<W>(&self, out: &mut W)
    where
        W: ?Sized + RedisWrite,
    {
        // infallible for this type
        let json = serde_json::to_vec(self).unwrap_or_default();
        out.write_arg(&json)
    }
}

impl FromRedisValue for RefreshTokenRecord {
    fn from_redis_value(v: &Value) -> RedisResult<Self> {
        let s: String = redis::from_redis_value(v)?;
        let record = serde_json::from_str::<RefreshTokenRecord>(&s).map_err(|e| {
            RedisError::from((
                redis::ErrorKind::TypeError,
                "invalid refresh token record",
                e.to_string(),
            ))
        })?;
        Ok(record)
    }
}

#[async_trait::async_trait]
impl RefreshTokenStore for RedisRefreshTokenStore {
    async fn put(
        &self,
        id: &RefreshTokenId,
        record: &RefreshTokenRecord,
    ) -> Result<(), AuthError> {
        let key = self.key(id);
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(&key, record, Self::ttl_secs(record.expires_at))
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, id: &RefreshTokenId) -> Result<Option<RefreshTokenRecord>, AuthError> {
        let key = self.key(id);
        let mut conn = self.conn.clone();
        let val: Option<RefreshTokenRecord> = conn
            .get(&key)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        Ok(val)
    }

    async fn delete(&self, id: &RefreshTokenId) -> Result<u64, AuthError> {
        let key = self.key(id);
        let mut conn = self.conn.clone();
        let removed: u64 = conn
            .del(&key)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        Ok(removed)
    }

    async fn purge_expired(&self, _now: DateTime<Utc>) -> Result<u64, AuthError> {
        // Key TTLs already do this.
        Ok(0)
    }
}
