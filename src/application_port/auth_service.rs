use crate::domain_model::*;
use chrono::{DateTime, Utc};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("authentication required")]
    Required,
    #[error("token invalid")]
    TokenInvalid,
    #[error("refresh token invalid")]
    RefreshInvalid,
    #[error("user not found")]
    UserNotFound,
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    /// Machine-readable code carried in error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Required => "AUTH_REQUIRED",
            AuthError::TokenInvalid => "AUTH_TOKEN_INVALID",
            AuthError::RefreshInvalid => "AUTH_REFRESH_INVALID",
            AuthError::UserNotFound => "USER_NOT_FOUND",
            AuthError::Store(_) => "STORE_ERROR",
            AuthError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

/// Signs and verifies access tokens. Pure CPU work over an immutable key.
pub trait TokenCodec: Send + Sync {
    fn encode(&self, subject: &Subject, now: DateTime<Utc>) -> Result<AccessToken, AuthError>;

    /// Every failure (malformed, bad signature, expired) is `TokenInvalid`.
    fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<Subject, AuthError>;

    fn decode(&self, token: &str) -> Result<Subject, AuthError> {
        self.decode_at(token, Utc::now())
    }

    fn new_refresh_id(&self) -> RefreshTokenId;
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    async fn issue(&self, subject: &Subject, now: DateTime<Utc>) -> Result<Token, AuthError>;

    async fn reissue_access_token(
        &self,
        refresh_id: &RefreshTokenId,
        now: DateTime<Utc>,
    ) -> Result<AccessToken, AuthError>;

    /// `Ok(false)` for an unknown id; only storage faults are errors.
    async fn logout(&self, refresh_id: &RefreshTokenId) -> Result<bool, AuthError>;

    /// Resolve the subject from a raw `Authorization` header value.
    fn authenticate(&self, authorization: Option<&str>) -> Result<Subject, AuthError>;
}
