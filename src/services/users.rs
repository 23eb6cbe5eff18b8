//! Member account management and loan history views

use crate::{
    error::{AppError, AppResult},
    models::{
        history::BorrowRecord,
        user::{CreateMember, PublicUser, Role, UpdateMember},
    },
    repository::Repository,
    services::auth::hash_password,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Create a member account. Librarian-created accounts always get the
    /// MEMBER role.
    pub async fn add_member(&self, member: CreateMember) -> AppResult<PublicUser> {
        let (username, password) = match (member.username, member.password) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u, p),
            _ => return Err(AppError::Validation("Missing required fields".to_string())),
        };

        if self.repository.users.username_exists(&username, None).await? {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        let hash = hash_password(&password)?;
        let user = self
            .repository
            .users
            .create(&username, &hash, Role::Member)
            .await?;

        Ok(user.into())
    }

    /// Update a member's username and/or password
    pub async fn update_member(&self, id: i32, update: UpdateMember) -> AppResult<PublicUser> {
        if update.username.is_none() && update.password.is_none() {
            return Err(AppError::Validation("Missing required fields".to_string()));
        }

        if let Some(ref username) = update.username {
            if self.repository.users.username_exists(username, Some(id)).await? {
                return Err(AppError::Conflict("Username already exists".to_string()));
            }
        }

        let password_hash = match update.password {
            Some(ref password) => Some(hash_password(password)?),
            None => None,
        };

        let user = self
            .repository
            .users
            .update_credentials(id, update.username.as_deref(), password_hash.as_deref())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(user.into())
    }

    /// Look up a single member
    pub async fn view_member(&self, id: i32) -> AppResult<PublicUser> {
        let user = self
            .repository
            .users
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(user.into())
    }

    /// Soft-delete a member account
    pub async fn remove_member(&self, id: i32) -> AppResult<()> {
        if !self.repository.users.deactivate(id).await? {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    /// Soft-delete the caller's own account
    pub async fn delete_own_account(&self, user_id: i32) -> AppResult<()> {
        if !self.repository.users.deactivate(user_id).await? {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        tracing::info!("User {} deleted their own account", user_id);
        Ok(())
    }

    /// Accounts still marked active
    pub async fn view_active_members(&self) -> AppResult<Vec<PublicUser>> {
        let users = self.repository.users.list_active().await?;
        Ok(users.into_iter().map(PublicUser::from).collect())
    }

    /// Soft-deleted accounts, credential fields stripped
    pub async fn view_deleted_members(&self) -> AppResult<Vec<PublicUser>> {
        let users = self.repository.users.list_deleted().await?;
        Ok(users.into_iter().map(PublicUser::from).collect())
    }

    /// Every loan record in the ledger
    pub async fn view_all_history(&self) -> AppResult<Vec<BorrowRecord>> {
        self.repository.history.list_all().await
    }

    /// The caller's own loan records
    pub async fn view_own_history(&self, user_id: i32) -> AppResult<Vec<BorrowRecord>> {
        self.repository.history.list_for_user(user_id).await
    }
}
