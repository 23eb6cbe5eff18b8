//! Authentication service: password hashing, token issuance and the
//! identity resolution used by the access-control gate.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{CurrentUser, PublicUser, Role, User, UserClaims},
    repository::Repository,
};

/// Hash a password using Argon2 with a fresh random salt
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored Argon2 hash
pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new account and return its public view plus a token.
    ///
    /// The role arrives as a plain string so an unknown value yields the
    /// validation failure rather than a deserialization rejection.
    pub async fn signup(
        &self,
        username: Option<String>,
        password: Option<String>,
        role: Option<String>,
    ) -> AppResult<(PublicUser, String)> {
        let (username, password, role) = match (username, password, role) {
            (Some(u), Some(p), Some(r)) if !u.is_empty() && !p.is_empty() && !r.is_empty() => {
                (u, p, r)
            }
            _ => return Err(AppError::Validation("Missing required fields".to_string())),
        };

        let role: Role = role
            .parse()
            .map_err(|_| AppError::Validation("Invalid role".to_string()))?;

        if self.repository.users.username_exists(&username, None).await? {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        let hash = hash_password(&password)?;
        let user = self.repository.users.create(&username, &hash, role).await?;

        tracing::info!("New {} account registered: {}", user.role, user.username);

        let token = self.create_token_for_user(&user)?;
        Ok((user.into(), token))
    }

    /// Authenticate by username and password.
    ///
    /// Unknown user, wrong password and deactivated account all collapse
    /// into the same generic failure so callers cannot enumerate accounts.
    pub async fn login(
        &self,
        username: Option<String>,
        password: Option<String>,
    ) -> AppResult<(PublicUser, String)> {
        let (username, password) = match (username, password) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u, p),
            _ => return Err(AppError::Validation("Missing required fields".to_string())),
        };

        let invalid = || AppError::Authentication("Invalid credentials".to_string());

        let user = self
            .repository
            .users
            .get_by_username(&username)
            .await?
            .ok_or_else(invalid)?;

        if !user.is_active {
            return Err(invalid());
        }

        if !verify_password(&user.password, &password)? {
            return Err(invalid());
        }

        let token = self.create_token_for_user(&user)?;
        Ok((user.into(), token))
    }

    /// Resolve the identity behind a verified token's user id.
    /// A missing or deactivated account invalidates the token.
    pub async fn resolve_identity(&self, user_id: i32) -> AppResult<CurrentUser> {
        let user = self
            .repository
            .users
            .get_by_id(user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::Authentication("Please authenticate".to_string()))?;

        Ok(CurrentUser {
            id: user.id,
            username: user.username,
            role: user.role,
        })
    }

    /// Create a signed JWT for a user
    fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            role: user.role,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }
}
