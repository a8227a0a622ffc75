use crate::application_port::*;
use crate::domain_model::*;

#[async_trait::async_trait]
pub trait UserRepo: Send + Sync {
    async fn get_by_id(&self, user_id: &UserId) -> Result<Option<UserProfile>, AuthError>;

    /// Insert or replace by id.
    async fn save(&self, profile: &UserProfile) -> Result<(), AuthError>;
}
