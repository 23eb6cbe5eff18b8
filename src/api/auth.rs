//! Authentication endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::user::{CurrentUser, PublicUser},
};

use super::AuthenticatedUser;

/// Signup request. The role is carried as a plain string so an unknown
/// value fails validation instead of deserialization.
#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// Login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Authentication response with the public user view and a signed token
#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: PublicUser,
    pub token: String,
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Missing fields, invalid role or username taken")
    )
)]
pub async fn signup(
    State(state): State<crate::AppState>,
    Json(request): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let (user, token) = state
        .services
        .auth
        .signup(request.username, request.password, request.role)
        .await?;

    Ok((StatusCode::CREATED, Json(AuthResponse { user, token })))
}

/// Authenticate with username and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = AuthResponse),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let (user, token) = state
        .services
        .auth
        .login(request.username, request.password)
        .await?;

    Ok(Json(AuthResponse { user, token }))
}

/// Get the identity behind the presented token
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current identity", body = CurrentUser),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(AuthenticatedUser(current): AuthenticatedUser) -> Json<CurrentUser> {
    Json(current)
}
