use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;

#[derive(Default)]
pub struct MemoryUserRepo {
    users: DashMap<UserId, UserProfile>,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserRepo for MemoryUserRepo {
    async fn get_by_id(&self, user_id: &UserId) -> Result<Option<UserProfile>, AuthError> {
        Ok(self.users.get(user_id).map(|entry| entry.value().clone()))
    }

    async fn save(&self, profile: &UserProfile) -> Result<(), AuthError> {
        self.users.insert(profile.id.clone(), profile.clone());
        Ok(())
    }
}
