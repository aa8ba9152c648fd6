use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::data::follow_store::FollowStore;
use crate::domain::error::DomainError;

use super::map_db_error;

#[derive(Debug, Clone)]
pub struct SqliteFollowStore {
    pool: SqlitePool,
}

impl SqliteFollowStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FollowStore for SqliteFollowStore {
    async fn add_edge(&self, follower_id: i64, followed_id: i64) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO follows (follower_id, followed_id)
            VALUES (?1, ?2)
            ON CONFLICT (follower_id, followed_id) DO NOTHING
            "#,
        )
        .bind(follower_id)
        .bind(followed_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    async fn remove_edge(&self, follower_id: i64, followed_id: i64) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            DELETE FROM follows
            WHERE follower_id = ?1 AND followed_id = ?2
            "#,
        )
        .bind(follower_id)
        .bind(followed_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    async fn edge_exists(&self, follower_id: i64, followed_id: i64) -> Result<bool, DomainError> {
        let found = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM follows
                WHERE follower_id = ?1 AND followed_id = ?2
            )
            "#,
        )
        .bind(follower_id)
        .bind(followed_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(found != 0)
    }

    async fn followers_count(&self, user_id: i64) -> Result<i64, DomainError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM follows
            WHERE followed_id = ?1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn following_count(&self, user_id: i64) -> Result<i64, DomainError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM follows
            WHERE follower_id = ?1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }
}
