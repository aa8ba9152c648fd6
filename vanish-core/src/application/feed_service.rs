use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::data::post_store::{FeedScope, NewPost, PostStore, PostWithAuthor};
use crate::data::user_store::UserStore;
use crate::domain::error::DomainError;
use crate::domain::expiry::ExpiryPolicy;
use crate::domain::post::{CreatePostRequest, Post};
use crate::domain::user::User;

pub const SEARCH_USER_LIMIT: i64 = 10;
pub const SEARCH_POST_LIMIT: i64 = 20;

#[derive(Debug, Clone, Serialize)]
pub struct AuthorView {
    pub username: String,
    pub avatar: String,
}

/// A post as read paths return it: the entity fields plus derived,
/// never-persisted presentation values. `remaining_seconds` is computed from
/// the same `now` that filtered the query, so one response cannot contain a
/// post it also considers expired.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: i64,
    pub content: String,
    pub author: AuthorView,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub created_at_formatted: String,
    pub remaining_seconds: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub users: Vec<User>,
    pub posts: Vec<PostView>,
}

/// Read/write surface for posts: creation, feeds, reply threads, search, and
/// remaining-lifetime lookups. Every read takes an explicit `now` from the
/// caller and never re-samples the clock mid-query.
pub struct FeedService<P: PostStore, U: UserStore> {
    posts: P,
    users: U,
    policy: ExpiryPolicy,
}

impl<P: PostStore, U: UserStore> FeedService<P, U> {
    pub fn new(posts: P, users: U, policy: ExpiryPolicy) -> Self {
        Self {
            posts,
            users,
            policy,
        }
    }

    /// Creates a post or, when `parent_id` is set, a reply. The stored
    /// `created_at` is the clock reading at insertion.
    pub async fn create_post(
        &self,
        author_id: i64,
        req: CreatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;

        self.users
            .get_user(author_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {author_id}")))?;

        if let Some(parent_id) = req.parent_id {
            self.posts
                .get_post(parent_id)
                .await?
                .ok_or_else(|| DomainError::NotFound(format!("post id: {parent_id}")))?;
        }

        let new_post = NewPost {
            content: req.content,
            author_id,
            parent_id: req.parent_id,
            created_at: Utc::now(),
        };
        self.posts.create_post(new_post).await
    }

    pub async fn feed(
        &self,
        scope: FeedScope,
        now: DateTime<Utc>,
    ) -> Result<Vec<PostView>, DomainError> {
        let rows = self.posts.feed(scope, self.policy.cutoff(now)).await?;
        Ok(self.views(rows, now))
    }

    /// Non-expired posts by one author, newest first (the profile page query).
    pub async fn posts_by_author(
        &self,
        author_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<PostView>, DomainError> {
        self.users
            .get_user(author_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {author_id}")))?;

        let rows = self
            .posts
            .posts_by_author(author_id, self.policy.cutoff(now))
            .await?;
        Ok(self.views(rows, now))
    }

    /// Non-expired replies to a post, oldest first. The parent must exist,
    /// though it may itself already be expired.
    pub async fn replies(
        &self,
        post_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<PostView>, DomainError> {
        self.posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))?;

        let rows = self
            .posts
            .replies_of(post_id, self.policy.cutoff(now))
            .await?;
        Ok(self.views(rows, now))
    }

    /// Seconds of lifetime left for a post still present in the store,
    /// clamped to zero once it has logically expired.
    pub async fn remaining_seconds(
        &self,
        post_id: i64,
        now: DateTime<Utc>,
    ) -> Result<f64, DomainError> {
        let post = self
            .posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))?;

        Ok(self.policy.remaining_seconds(post.created_at, now))
    }

    /// Case-insensitive substring search over usernames and non-expired post
    /// content, capped at [`SEARCH_USER_LIMIT`] / [`SEARCH_POST_LIMIT`].
    pub async fn search(
        &self,
        query: &str,
        now: DateTime<Utc>,
    ) -> Result<SearchResults, DomainError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(SearchResults {
                users: Vec::new(),
                posts: Vec::new(),
            });
        }

        let users = self.users.search_users(query, SEARCH_USER_LIMIT).await?;
        let rows = self
            .posts
            .search_posts(query, self.policy.cutoff(now), SEARCH_POST_LIMIT)
            .await?;

        Ok(SearchResults {
            users,
            posts: self.views(rows, now),
        })
    }

    fn views(&self, rows: Vec<PostWithAuthor>, now: DateTime<Utc>) -> Vec<PostView> {
        rows.into_iter().map(|row| self.view(row, now)).collect()
    }

    fn view(&self, row: PostWithAuthor, now: DateTime<Utc>) -> PostView {
        let remaining_seconds = self.policy.remaining_seconds(row.post.created_at, now);
        PostView {
            id: row.post.id,
            content: row.post.content,
            author: AuthorView {
                username: row.author_username,
                avatar: row.author_avatar,
            },
            parent_id: row.post.parent_id,
            created_at: row.post.created_at,
            created_at_formatted: row.post.created_at.format("%H:%M").to_string(),
            remaining_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{DateTime, Duration, Utc};

    use super::{FeedService, SEARCH_POST_LIMIT, SEARCH_USER_LIMIT};
    use crate::data::post_store::{FeedScope, NewPost, PostStore, PostWithAuthor};
    use crate::data::user_store::{NewUser, UserStore};
    use crate::domain::error::DomainError;
    use crate::domain::expiry::ExpiryPolicy;
    use crate::domain::post::{CreatePostRequest, Post};
    use crate::domain::user::{ProfilePatch, User};

    #[derive(Clone, Default)]
    struct FakePostStore {
        created_input: Arc<Mutex<Option<NewPost>>>,
        post_for_get: Arc<Mutex<Option<Post>>>,
        list_result: Arc<Mutex<Vec<PostWithAuthor>>>,
        seen_cutoff: Arc<Mutex<Option<DateTime<Utc>>>>,
        seen_search_limit: Arc<Mutex<Option<i64>>>,
    }

    #[async_trait]
    impl PostStore for FakePostStore {
        async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
            *self
                .created_input
                .lock()
                .expect("created_input mutex poisoned") = Some(input.clone());
            Post::new(
                1,
                input.content,
                input.author_id,
                input.parent_id,
                input.created_at,
            )
        }

        async fn get_post(&self, _id: i64) -> Result<Option<Post>, DomainError> {
            Ok(self
                .post_for_get
                .lock()
                .expect("post_for_get mutex poisoned")
                .clone())
        }

        async fn feed(
            &self,
            _scope: FeedScope,
            cutoff: DateTime<Utc>,
        ) -> Result<Vec<PostWithAuthor>, DomainError> {
            *self.seen_cutoff.lock().expect("seen_cutoff mutex poisoned") = Some(cutoff);
            Ok(self
                .list_result
                .lock()
                .expect("list_result mutex poisoned")
                .clone())
        }

        async fn posts_by_author(
            &self,
            _author_id: i64,
            _cutoff: DateTime<Utc>,
        ) -> Result<Vec<PostWithAuthor>, DomainError> {
            Ok(self
                .list_result
                .lock()
                .expect("list_result mutex poisoned")
                .clone())
        }

        async fn replies_of(
            &self,
            _parent_id: i64,
            _cutoff: DateTime<Utc>,
        ) -> Result<Vec<PostWithAuthor>, DomainError> {
            Ok(self
                .list_result
                .lock()
                .expect("list_result mutex poisoned")
                .clone())
        }

        async fn search_posts(
            &self,
            _query: &str,
            _cutoff: DateTime<Utc>,
            limit: i64,
        ) -> Result<Vec<PostWithAuthor>, DomainError> {
            *self
                .seen_search_limit
                .lock()
                .expect("seen_search_limit mutex poisoned") = Some(limit);
            Ok(self
                .list_result
                .lock()
                .expect("list_result mutex poisoned")
                .clone())
        }

        async fn delete_expired(&self, _cutoff: DateTime<Utc>) -> Result<u64, DomainError> {
            Ok(0)
        }
    }

    #[derive(Clone, Default)]
    struct FakeUserStore {
        user_for_get: Arc<Mutex<Option<User>>>,
        seen_search_limit: Arc<Mutex<Option<i64>>>,
    }

    #[async_trait]
    impl UserStore for FakeUserStore {
        async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
            User::new(
                1,
                input.username,
                input.email,
                None,
                "default.jpg",
                input.created_at,
            )
        }

        async fn get_user(&self, _id: i64) -> Result<Option<User>, DomainError> {
            Ok(self
                .user_for_get
                .lock()
                .expect("user_for_get mutex poisoned")
                .clone())
        }

        async fn find_by_username(&self, _username: &str) -> Result<Option<User>, DomainError> {
            Ok(None)
        }

        async fn find_by_email(&self, _email: &str) -> Result<Option<User>, DomainError> {
            Ok(None)
        }

        async fn update_profile(
            &self,
            _user_id: i64,
            _patch: ProfilePatch,
        ) -> Result<Option<User>, DomainError> {
            Ok(None)
        }

        async fn delete_user(&self, _id: i64) -> Result<bool, DomainError> {
            Ok(false)
        }

        async fn search_users(&self, _query: &str, limit: i64) -> Result<Vec<User>, DomainError> {
            *self
                .seen_search_limit
                .lock()
                .expect("seen_search_limit mutex poisoned") = Some(limit);
            Ok(Vec::new())
        }
    }

    fn service(
        posts: FakePostStore,
        users: FakeUserStore,
    ) -> FeedService<FakePostStore, FakeUserStore> {
        FeedService::new(posts, users, ExpiryPolicy::default())
    }

    fn sample_user(id: i64) -> User {
        User::new(
            id,
            "author",
            "author@example.com",
            None,
            "default.jpg",
            Utc::now(),
        )
        .expect("sample user must be valid")
    }

    fn sample_row(id: i64, created_at: DateTime<Utc>) -> PostWithAuthor {
        PostWithAuthor {
            post: Post::new(id, "hello", 10, None, created_at).expect("sample post must be valid"),
            author_username: "author".to_string(),
            author_avatar: "default.jpg".to_string(),
        }
    }

    #[tokio::test]
    async fn create_post_normalizes_and_stamps_insertion_time() {
        let posts = FakePostStore::default();
        let users = FakeUserStore::default();
        *users
            .user_for_get
            .lock()
            .expect("user_for_get mutex poisoned") = Some(sample_user(10));

        let service = service(posts.clone(), users);
        let before = Utc::now();
        let created = service
            .create_post(
                10,
                CreatePostRequest {
                    content: "  hello  ".to_string(),
                    parent_id: None,
                },
            )
            .await
            .expect("create_post must succeed");
        let after = Utc::now();

        assert_eq!(created.content, "hello");

        let input = posts
            .created_input
            .lock()
            .expect("created_input mutex poisoned")
            .clone()
            .expect("store input must be captured");
        assert_eq!(input.author_id, 10);
        assert!(input.created_at >= before && input.created_at <= after);
    }

    #[tokio::test]
    async fn create_post_rejects_unknown_author() {
        let service = service(FakePostStore::default(), FakeUserStore::default());

        let err = service
            .create_post(
                10,
                CreatePostRequest {
                    content: "hello".to_string(),
                    parent_id: None,
                },
            )
            .await
            .expect_err("unknown author must fail");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn create_reply_requires_existing_parent() {
        let posts = FakePostStore::default();
        let users = FakeUserStore::default();
        *users
            .user_for_get
            .lock()
            .expect("user_for_get mutex poisoned") = Some(sample_user(10));

        let service = service(posts, users);
        let err = service
            .create_post(
                10,
                CreatePostRequest {
                    content: "re: hello".to_string(),
                    parent_id: Some(99),
                },
            )
            .await
            .expect_err("missing parent must fail");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn feed_attaches_remaining_time_from_query_now() {
        let posts = FakePostStore::default();
        let now = Utc::now();
        *posts.list_result.lock().expect("list_result mutex poisoned") =
            vec![sample_row(1, now - Duration::hours(1))];

        let service = service(posts.clone(), FakeUserStore::default());
        let views = service
            .feed(FeedScope::All, now)
            .await
            .expect("feed must succeed");

        assert_eq!(views.len(), 1);
        assert_eq!(views[0].remaining_seconds, 7200.0);

        let cutoff = posts
            .seen_cutoff
            .lock()
            .expect("seen_cutoff mutex poisoned")
            .expect("cutoff must be captured");
        assert_eq!(cutoff, now - Duration::hours(3));
    }

    #[tokio::test]
    async fn replies_return_not_found_for_unknown_parent() {
        let service = service(FakePostStore::default(), FakeUserStore::default());

        let err = service
            .replies(42, Utc::now())
            .await
            .expect_err("parent must be missing");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn remaining_seconds_clamps_expired_post_to_zero() {
        let posts = FakePostStore::default();
        let now = Utc::now();
        *posts
            .post_for_get
            .lock()
            .expect("post_for_get mutex poisoned") = Some(
            Post::new(7, "old", 10, None, now - Duration::hours(4))
                .expect("sample post must be valid"),
        );

        let service = service(posts, FakeUserStore::default());
        let remaining = service
            .remaining_seconds(7, now)
            .await
            .expect("post is present");
        assert_eq!(remaining, 0.0);
    }

    #[tokio::test]
    async fn search_applies_result_caps() {
        let posts = FakePostStore::default();
        let users = FakeUserStore::default();

        let service = service(posts.clone(), users.clone());
        service
            .search("hello", Utc::now())
            .await
            .expect("search must succeed");

        assert_eq!(
            *posts
                .seen_search_limit
                .lock()
                .expect("seen_search_limit mutex poisoned"),
            Some(SEARCH_POST_LIMIT)
        );
        assert_eq!(
            *users
                .seen_search_limit
                .lock()
                .expect("seen_search_limit mutex poisoned"),
            Some(SEARCH_USER_LIMIT)
        );
    }

    #[tokio::test]
    async fn search_with_blank_query_short_circuits() {
        let posts = FakePostStore::default();
        let users = FakeUserStore::default();

        let service = service(posts.clone(), users.clone());
        let results = service
            .search("   ", Utc::now())
            .await
            .expect("search must succeed");

        assert!(results.users.is_empty());
        assert!(results.posts.is_empty());
        assert!(
            posts
                .seen_search_limit
                .lock()
                .expect("seen_search_limit mutex poisoned")
                .is_none()
        );
    }
}
