use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// A micro-post. Content and the parent link are immutable after creation;
/// a post leaves the system only through expiry or a cascading delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub content: String,
    pub author_id: i64,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn new(
        id: i64,
        content: impl Into<String>,
        author_id: i64,
        parent_id: Option<i64>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        validate_positive_i64("id", id)?;
        validate_positive_i64("author_id", author_id)?;
        if let Some(parent_id) = parent_id {
            validate_positive_i64("parent_id", parent_id)?;
        }
        let content = normalize_content(&content.into())?;

        Ok(Self {
            id,
            content,
            author_id,
            parent_id,
            created_at,
        })
    }

    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub content: String,
    pub parent_id: Option<i64>,
}

impl CreatePostRequest {
    pub fn validate(self) -> Result<Self, DomainError> {
        if let Some(parent_id) = self.parent_id {
            validate_positive_i64("parent_id", parent_id)?;
        }
        Ok(Self {
            content: normalize_content(&self.content)?,
            parent_id: self.parent_id,
        })
    }
}

fn validate_positive_i64(field: &'static str, value: i64) -> Result<(), DomainError> {
    if value <= 0 {
        return Err(DomainError::Validation {
            field,
            message: "must be > 0",
        });
    }
    Ok(())
}

fn normalize_content(content: &str) -> Result<String, DomainError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(DomainError::Validation {
            field: "content",
            message: "must not be empty",
        });
    }
    Ok(content.to_string())
}
