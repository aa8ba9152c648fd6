use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use super::error::DomainError;

pub const DEFAULT_AVATAR: &str = "default.jpg";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub bio: Option<String>,
    pub avatar: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        id: i64,
        username: impl Into<String>,
        email: impl Into<String>,
        bio: Option<String>,
        avatar: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::Validation {
                field: "id",
                message: "must be > 0",
            });
        }
        let username = normalize_username(&username.into())?;
        let email = normalize_email(&email.into())?;

        Ok(Self {
            id,
            username,
            email,
            bio,
            avatar: avatar.into(),
            created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    /// Opaque credential produced by the identity collaborator; this crate
    /// never hashes or verifies passwords.
    pub password_hash: String,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<Self, DomainError> {
        let username = normalize_username(&self.username)?;
        let email = normalize_email(&self.email)?;
        if self.password_hash.is_empty() {
            return Err(DomainError::Validation {
                field: "password_hash",
                message: "must not be empty",
            });
        }
        Ok(Self {
            username,
            email,
            password_hash: self.password_hash,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfilePatch {
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

impl ProfilePatch {
    pub fn validate(self) -> Result<Self, DomainError> {
        if let Some(bio) = &self.bio
            && bio.chars().count() > 500
        {
            return Err(DomainError::Validation {
                field: "bio",
                message: "must be at most 500 chars",
            });
        }
        if let Some(avatar) = &self.avatar {
            let avatar = avatar.trim();
            if avatar.is_empty() || avatar.len() > 200 {
                return Err(DomainError::Validation {
                    field: "avatar",
                    message: "must be 1..200 chars",
                });
            }
        }
        Ok(self)
    }
}

fn normalize_username(username: &str) -> Result<String, DomainError> {
    let username = username.trim();
    if username.len() < 3 || username.len() > 50 {
        return Err(DomainError::Validation {
            field: "username",
            message: "must be 3..50 chars",
        });
    }
    Ok(username.to_string())
}

fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();
    if !email.validate_email() {
        return Err(DomainError::Validation {
            field: "email",
            message: "must be a valid email",
        });
    }
    Ok(email)
}
