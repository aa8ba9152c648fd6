use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::error::DomainError;
use crate::domain::post::Post;

#[derive(Debug, Clone)]
pub struct NewPost {
    pub content: String,
    pub author_id: i64,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Which slice of the feed a query covers.
#[derive(Debug, Clone, Copy)]
pub enum FeedScope {
    /// Every author.
    All,
    /// Posts by users the viewer follows, plus the viewer's own posts.
    Followed { viewer_id: i64 },
}

/// A post joined with the author fields the read paths surface.
#[derive(Debug, Clone)]
pub struct PostWithAuthor {
    pub post: Post,
    pub author_username: String,
    pub author_avatar: String,
}

/// Store contract for posts. Every read takes an explicit `cutoff`
/// (`now - ttl`, precomputed by the caller) so the SQL filter and the
/// in-process remaining-time math share one time boundary.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError>;
    async fn feed(
        &self,
        scope: FeedScope,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<PostWithAuthor>, DomainError>;
    async fn posts_by_author(
        &self,
        author_id: i64,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<PostWithAuthor>, DomainError>;
    async fn replies_of(
        &self,
        parent_id: i64,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<PostWithAuthor>, DomainError>;
    async fn search_posts(
        &self,
        query: &str,
        cutoff: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<PostWithAuthor>, DomainError>;
    /// Deletes every post with `created_at < cutoff` in one atomic batch;
    /// reply subtrees go with their parents via cascade. Returns the number
    /// of directly deleted rows.
    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError>;
}
