use chrono::Utc;

use crate::data::user_store::{NewUser, UserStore};
use crate::domain::error::DomainError;
use crate::domain::user::{ProfilePatch, RegisterRequest, User};

/// User lifecycle outside the follow graph: registration, profile lookup and
/// editing, deletion. Authentication itself (hashing, sessions) belongs to
/// the identity collaborator; this service only stores the opaque credential
/// it is handed.
pub struct AccountService<U: UserStore> {
    users: U,
}

impl<U: UserStore> AccountService<U> {
    pub fn new(users: U) -> Self {
        Self { users }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<User, DomainError> {
        let req = req.validate()?;

        if self.users.find_by_username(&req.username).await?.is_some() {
            return Err(DomainError::AlreadyExists(format!(
                "username: {}",
                req.username
            )));
        }
        if self.users.find_by_email(&req.email).await?.is_some() {
            return Err(DomainError::AlreadyExists(format!("email: {}", req.email)));
        }

        let new_user = NewUser {
            username: req.username,
            email: req.email,
            password_hash: req.password_hash,
            created_at: Utc::now(),
        };
        self.users.create_user(new_user).await
    }

    pub async fn find_profile(&self, username: &str) -> Result<User, DomainError> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("username: {username}")))
    }

    /// Updates bio and/or avatar; fields left as `None` keep their value.
    pub async fn edit_profile(
        &self,
        user_id: i64,
        patch: ProfilePatch,
    ) -> Result<User, DomainError> {
        let patch = patch.validate()?;
        self.users
            .update_profile(user_id, patch)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {user_id}")))
    }

    /// Removes the user; their posts (with entire reply subtrees) and follow
    /// edges go with them.
    pub async fn delete_user(&self, user_id: i64) -> Result<(), DomainError> {
        let deleted = self.users.delete_user(user_id).await?;
        if !deleted {
            return Err(DomainError::NotFound(format!("user id: {user_id}")));
        }
        Ok(())
    }
}
