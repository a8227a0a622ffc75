use super::token_issuer::store_call;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use std::sync::Arc;

pub struct SessionRevoker {
    store: Arc<dyn RefreshTokenStore>,
    store_timeout: std::time::Duration,
}

impl SessionRevoker {
    pub fn new(store: Arc<dyn RefreshTokenStore>, store_timeout: std::time::Duration) -> Self {
        Self {
            store,
            store_timeout,
        }
    }

    /// `true` iff a live session was removed. A missing session is not an error.
    pub async fn logout(&self, refresh_id: &RefreshTokenId) -> Result<bool, AuthError> {
        let removed = store_call(
            self.store_timeout,
            "delete refresh token",
            self.store.delete(refresh_id),
        )
        .await?;

        if removed == 0 {
            debug!("logout for unknown refresh token");
        }
        Ok(removed > 0)
    }
}
