use async_trait::async_trait;

use crate::domain::error::DomainError;

/// Store contract for the follow relation. Adding an existing edge and
/// removing a missing one are both no-ops; the self-follow rule lives in the
/// service layer, not here.
#[async_trait]
pub trait FollowStore: Send + Sync {
    async fn add_edge(&self, follower_id: i64, followed_id: i64) -> Result<(), DomainError>;
    async fn remove_edge(&self, follower_id: i64, followed_id: i64) -> Result<(), DomainError>;
    async fn edge_exists(&self, follower_id: i64, followed_id: i64) -> Result<bool, DomainError>;
    async fn followers_count(&self, user_id: i64) -> Result<i64, DomainError>;
    async fn following_count(&self, user_id: i64) -> Result<i64, DomainError>;
}
