use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::data::post_store::{FeedScope, NewPost, PostStore, PostWithAuthor};
use crate::domain::error::DomainError;
use crate::domain::post::Post;

use super::{instant_from_micros, map_db_error, micros};

#[derive(Debug, Clone)]
pub struct SqlitePostStore {
    pool: SqlitePool,
}

impl SqlitePostStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    content: String,
    author_id: i64,
    parent_id: Option<i64>,
    created_at: i64,
}

#[derive(sqlx::FromRow)]
struct PostWithAuthorRow {
    id: i64,
    content: String,
    author_id: i64,
    parent_id: Option<i64>,
    created_at: i64,
    author_username: String,
    author_avatar: String,
}

#[async_trait]
impl PostStore for SqlitePostStore {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (content, author_id, parent_id, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, content, author_id, parent_id, created_at
            "#,
        )
        .bind(&input.content)
        .bind(input.author_id)
        .bind(input.parent_id)
        .bind(micros(input.created_at))
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        map_post_row(row)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, content, author_id, parent_id, created_at
            FROM posts
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.map(map_post_row).transpose()
    }

    async fn feed(
        &self,
        scope: FeedScope,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<PostWithAuthor>, DomainError> {
        let rows = match scope {
            FeedScope::All => {
                sqlx::query_as::<_, PostWithAuthorRow>(
                    r#"
                    SELECT p.id, p.content, p.author_id, p.parent_id, p.created_at,
                           u.username AS author_username, u.avatar AS author_avatar
                    FROM posts p
                    JOIN users u ON u.id = p.author_id
                    WHERE p.created_at > ?1
                    ORDER BY p.created_at DESC, p.id DESC
                    "#,
                )
                .bind(micros(cutoff))
                .fetch_all(&self.pool)
                .await
            }
            // Own posts and followed authors in one predicate, so a post can
            // never appear twice however the viewer's graph overlaps.
            FeedScope::Followed { viewer_id } => {
                sqlx::query_as::<_, PostWithAuthorRow>(
                    r#"
                    SELECT p.id, p.content, p.author_id, p.parent_id, p.created_at,
                           u.username AS author_username, u.avatar AS author_avatar
                    FROM posts p
                    JOIN users u ON u.id = p.author_id
                    WHERE p.created_at > ?1
                      AND (p.author_id = ?2 OR p.author_id IN (
                        SELECT followed_id FROM follows WHERE follower_id = ?2
                      ))
                    ORDER BY p.created_at DESC, p.id DESC
                    "#,
                )
                .bind(micros(cutoff))
                .bind(viewer_id)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(map_db_error)?;

        rows.into_iter().map(map_row_with_author).collect()
    }

    async fn posts_by_author(
        &self,
        author_id: i64,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<PostWithAuthor>, DomainError> {
        let rows = sqlx::query_as::<_, PostWithAuthorRow>(
            r#"
            SELECT p.id, p.content, p.author_id, p.parent_id, p.created_at,
                   u.username AS author_username, u.avatar AS author_avatar
            FROM posts p
            JOIN users u ON u.id = p.author_id
            WHERE p.author_id = ?1 AND p.created_at > ?2
            ORDER BY p.created_at DESC, p.id DESC
            "#,
        )
        .bind(author_id)
        .bind(micros(cutoff))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(map_row_with_author).collect()
    }

    async fn replies_of(
        &self,
        parent_id: i64,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<PostWithAuthor>, DomainError> {
        let rows = sqlx::query_as::<_, PostWithAuthorRow>(
            r#"
            SELECT p.id, p.content, p.author_id, p.parent_id, p.created_at,
                   u.username AS author_username, u.avatar AS author_avatar
            FROM posts p
            JOIN users u ON u.id = p.author_id
            WHERE p.parent_id = ?1 AND p.created_at > ?2
            ORDER BY p.created_at ASC, p.id ASC
            "#,
        )
        .bind(parent_id)
        .bind(micros(cutoff))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(map_row_with_author).collect()
    }

    async fn search_posts(
        &self,
        query: &str,
        cutoff: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<PostWithAuthor>, DomainError> {
        // LIKE is case-insensitive for ASCII under SQLite's default collation.
        let rows = sqlx::query_as::<_, PostWithAuthorRow>(
            r#"
            SELECT p.id, p.content, p.author_id, p.parent_id, p.created_at,
                   u.username AS author_username, u.avatar AS author_avatar
            FROM posts p
            JOIN users u ON u.id = p.author_id
            WHERE p.content LIKE ?1 AND p.created_at > ?2
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT ?3
            "#,
        )
        .bind(format!("%{query}%"))
        .bind(micros(cutoff))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(map_row_with_author).collect()
    }

    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE created_at < ?1
            "#,
        )
        .bind(micros(cutoff))
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}

fn map_post_row(row: PostRow) -> Result<Post, DomainError> {
    Post::new(
        row.id,
        row.content,
        row.author_id,
        row.parent_id,
        instant_from_micros(row.created_at)?,
    )
    .map_err(|err| DomainError::Storage(err.to_string()))
}

fn map_row_with_author(row: PostWithAuthorRow) -> Result<PostWithAuthor, DomainError> {
    let post = map_post_row(PostRow {
        id: row.id,
        content: row.content,
        author_id: row.author_id,
        parent_id: row.parent_id,
        created_at: row.created_at,
    })?;

    Ok(PostWithAuthor {
        post,
        author_username: row.author_username,
        author_avatar: row.author_avatar,
    })
}
