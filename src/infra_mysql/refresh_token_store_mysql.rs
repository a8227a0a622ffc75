use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

pub struct MySqlRefreshTokenStore {
    pool: MySqlPool,
}

impl MySqlRefreshTokenStore {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlRefreshTokenStore { pool }
    }

    fn row_to_record(row: MySqlRow) -> Result<RefreshTokenRecord, AuthError> {
        let user_id: String = row
            .try_get("user_id")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let role: String = row
            .try_get("role")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let role = role
            .parse::<Role>()
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let expires_at: DateTime<Utc> = row
            .try_get("expires_at")
            .map_err(|e| AuthError::Store(e.to_string()))?;

        Ok(RefreshTokenRecord {
            subject: Subject::new(user_id, role),
            expires_at,
        })
    }
}

#[async_trait::async_trait]
impl RefreshTokenStore for MySqlRefreshTokenStore {
    async fn put(
        &self,
        id: &RefreshTokenId,
        record: &RefreshTokenRecord,
    ) -> Result<(), AuthError> {
        sqlx::query(
            r#"
INSERT INTO refresh_token (token_hash, user_id, role, expires_at)
VALUES (?, ?, ?, ?)
"#,
        )
        .bind(refresh_id_digest(id))
        .bind(&record.subject.user_id)
        .bind(record.subject.role.as_str())
        .bind(record.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?;

        Ok(())
    }

    async fn get(&self, id: &RefreshTokenId) -> Result<Option<RefreshTokenRecord>, AuthError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT user_id, role, expires_at
FROM refresh_token
WHERE token_hash = ?
"#,
        )
        .bind(refresh_id_digest(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?;

        row_opt.map(Self::row_to_record).transpose()
    }

    async fn delete(&self, id: &RefreshTokenId) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM refresh_token WHERE token_hash = ?")
            .bind(refresh_id_digest(id))
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM refresh_token WHERE expires_at < ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::Store(format!("purge refresh tokens: {e}")))?;

        Ok(result.rows_affected())
    }
}
