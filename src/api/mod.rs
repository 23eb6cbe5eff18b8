//! API handlers for the Biblio REST endpoints

pub mod auth;
pub mod books;
pub mod health;
pub mod openapi;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{error::AppError, models::user::CurrentUser, AppState};

/// Extractor for the authenticated user behind a bearer token.
///
/// Verifies the token signature and expiry, then resolves the referenced
/// user from the store so a deleted or deactivated account invalidates
/// outstanding tokens immediately.
pub struct AuthenticatedUser(pub CurrentUser);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let unauthenticated = || AppError::Authentication("Please authenticate".to_string());

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(unauthenticated)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(unauthenticated)?;

        let claims = crate::models::user::UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|_| unauthenticated())?;

        let current = state.services.auth.resolve_identity(claims.user_id).await?;

        Ok(AuthenticatedUser(current))
    }
}
