use serde::Serialize;

use crate::data::follow_store::FollowStore;
use crate::data::user_store::UserStore;
use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FollowStats {
    pub followers_count: i64,
    pub following_count: i64,
    pub is_following: bool,
}

/// Follow-graph mutations and derived counts. Both mutations are idempotent:
/// re-following an already-followed user and unfollowing a non-edge are
/// no-ops, never errors.
pub struct SocialService<F: FollowStore, U: UserStore> {
    follows: F,
    users: U,
}

impl<F: FollowStore, U: UserStore> SocialService<F, U> {
    pub fn new(follows: F, users: U) -> Self {
        Self { follows, users }
    }

    pub async fn follow(&self, follower_id: i64, target_id: i64) -> Result<(), DomainError> {
        if follower_id == target_id {
            return Err(DomainError::SelfFollow);
        }
        self.ensure_user(target_id).await?;
        self.follows.add_edge(follower_id, target_id).await
    }

    pub async fn unfollow(&self, follower_id: i64, target_id: i64) -> Result<(), DomainError> {
        if follower_id == target_id {
            return Err(DomainError::SelfFollow);
        }
        self.ensure_user(target_id).await?;
        self.follows.remove_edge(follower_id, target_id).await
    }

    pub async fn is_following(&self, follower_id: i64, target_id: i64) -> Result<bool, DomainError> {
        self.follows.edge_exists(follower_id, target_id).await
    }

    pub async fn followers_count(&self, user_id: i64) -> Result<i64, DomainError> {
        self.ensure_user(user_id).await?;
        self.follows.followers_count(user_id).await
    }

    pub async fn following_count(&self, user_id: i64) -> Result<i64, DomainError> {
        self.ensure_user(user_id).await?;
        self.follows.following_count(user_id).await
    }

    /// Both counts plus whether the viewer follows the user, in one shot (the
    /// shape the follower-count API returns).
    pub async fn follow_stats(
        &self,
        viewer_id: i64,
        user_id: i64,
    ) -> Result<FollowStats, DomainError> {
        self.ensure_user(user_id).await?;

        Ok(FollowStats {
            followers_count: self.follows.followers_count(user_id).await?,
            following_count: self.follows.following_count(user_id).await?,
            is_following: self.follows.edge_exists(viewer_id, user_id).await?,
        })
    }

    async fn ensure_user(&self, user_id: i64) -> Result<(), DomainError> {
        self.users
            .get_user(user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {user_id}")))?;
        Ok(())
    }
}
