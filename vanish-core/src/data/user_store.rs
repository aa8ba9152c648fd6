use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::error::DomainError;
use crate::domain::user::{ProfilePatch, User};

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError>;
    async fn get_user(&self, id: i64) -> Result<Option<User>, DomainError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;
    async fn update_profile(
        &self,
        user_id: i64,
        patch: ProfilePatch,
    ) -> Result<Option<User>, DomainError>;
    /// Deletes the user; posts (with their reply subtrees) and follow edges
    /// go with it via cascade.
    async fn delete_user(&self, id: i64) -> Result<bool, DomainError>;
    async fn search_users(&self, query: &str, limit: i64) -> Result<Vec<User>, DomainError>;
}
