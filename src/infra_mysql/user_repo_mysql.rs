use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

pub struct MySqlUserRepo {
    pool: MySqlPool,
}

impl MySqlUserRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlUserRepo { pool }
    }

    fn row_to_profile(row: MySqlRow) -> Result<UserProfile, AuthError> {
        let read = |e: sqlx::Error| AuthError::Store(format!("read user row: {e}"));
        Ok(UserProfile {
            id: row.try_get::<UserId, _>("user_id").map_err(read)?,
            email: row.try_get("email").map_err(read)?,
            nickname: row.try_get("nickname").map_err(read)?,
            age_group: row.try_get("age_group").map_err(read)?,
            gender: row.try_get("gender").map_err(read)?,
            is_joined: row.try_get("is_joined").map_err(read)?,
        })
    }
}

#[async_trait::async_trait]
impl UserRepo for MySqlUserRepo {
    async fn get_by_id(&self, user_id: &UserId) -> Result<Option<UserProfile>, AuthError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT user_id, email, nickname, age_group, gender, is_joined
FROM user
WHERE user_id = ?
"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Store(format!("query user: {e}")))?;

        row_opt.map(Self::row_to_profile).transpose()
    }

    async fn save(&self, profile: &UserProfile) -> Result<(), AuthError> {
        sqlx::query(
            r#"
INSERT INTO user (user_id, email, nickname, age_group, gender, is_joined)
VALUES (?, ?, ?, ?, ?, ?)
ON DUPLICATE KEY UPDATE
    email = VALUES(email),
    nickname = VALUES(nickname),
    age_group = VALUES(age_group),
    gender = VALUES(gender),
    is_joined = VALUES(is_joined)
"#,
        )
        .bind(&profile.id)
        .bind(&profile.email)
        .bind(&profile.nickname)
        .bind(&profile.age_group)
        .bind(&profile.gender)
        .bind(profile.is_joined)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?;

        Ok(())
    }
}
