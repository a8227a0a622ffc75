use super::auth_guard;
use crate::application_impl::{SessionRevoker, TokenIssuer};
use crate::application_port::*;
use crate::domain_model::*;
use crate::logger::*;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub struct RealAuthService {
    token_codec: Arc<dyn TokenCodec>,
    issuer: TokenIssuer,
    revoker: SessionRevoker,
}

impl RealAuthService {
    pub fn new(token_codec: Arc<dyn TokenCodec>, issuer: TokenIssuer, revoker: SessionRevoker) -> Self {
        Self {
            token_codec,
            issuer,
            revoker,
        }
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn issue(&self, subject: &Subject, now: DateTime<Utc>) -> Result<Token, AuthError> {
        let token = self.issuer.issue(subject, now).await?;
        info!(user_id = %subject.user_id, "session opened");
        Ok(token)
    }

    async fn reissue_access_token(
        &self,
        refresh_id: &RefreshTokenId,
        now: DateTime<Utc>,
    ) -> Result<AccessToken, AuthError> {
        self.issuer
            .reissue_access_token(refresh_id, now)
            .await
            .inspect_err(|e| debug!("reissue rejected: {}", e))
    }

    async fn logout(&self, refresh_id: &RefreshTokenId) -> Result<bool, AuthError> {
        let revoked = self.revoker.logout(refresh_id).await?;
        if revoked {
            info!("session closed");
        }
        Ok(revoked)
    }

    fn authenticate(&self, authorization: Option<&str>) -> Result<Subject, AuthError> {
        auth_guard::authenticate(authorization, self.token_codec.as_ref())
    }
}
