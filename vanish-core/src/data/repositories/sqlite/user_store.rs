use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::data::user_store::{NewUser, UserStore};
use crate::domain::error::DomainError;
use crate::domain::user::{ProfilePatch, User};

use super::{instant_from_micros, map_db_error, micros};

#[derive(Debug, Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    bio: Option<String>,
    avatar: String,
    created_at: i64,
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, email, password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, username, email, bio, avatar, created_at
            "#,
        )
        .bind(&input.username)
        .bind(&input.email)
        .bind(&input.password_hash)
        .bind(micros(input.created_at))
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        map_user_row(row)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, bio, avatar, created_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.map(map_user_row).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, bio, avatar, created_at
            FROM users
            WHERE username = ?1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.map(map_user_row).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, bio, avatar, created_at
            FROM users
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.map(map_user_row).transpose()
    }

    async fn update_profile(
        &self,
        user_id: i64,
        patch: ProfilePatch,
    ) -> Result<Option<User>, DomainError> {
        // None leaves the column untouched; everything else on a user is
        // immutable after registration.
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET bio = COALESCE(?2, bio),
                avatar = COALESCE(?3, avatar)
            WHERE id = ?1
            RETURNING id, username, email, bio, avatar, created_at
            "#,
        )
        .bind(user_id)
        .bind(patch.bio)
        .bind(patch.avatar)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.map(map_user_row).transpose()
    }

    async fn delete_user(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn search_users(&self, query: &str, limit: i64) -> Result<Vec<User>, DomainError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, bio, avatar, created_at
            FROM users
            WHERE username LIKE ?1
            ORDER BY username ASC
            LIMIT ?2
            "#,
        )
        .bind(format!("%{query}%"))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(map_user_row).collect()
    }
}

fn map_user_row(row: UserRow) -> Result<User, DomainError> {
    User::new(
        row.id,
        row.username,
        row.email,
        row.bio,
        row.avatar,
        instant_from_micros(row.created_at)?,
    )
    .map_err(|err| DomainError::Storage(err.to_string()))
}
