//! Member account and loan history endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        history::BorrowRecord,
        user::{CreateMember, PublicUser, UpdateMember},
    },
};

use super::{books::MessageResponse, AuthenticatedUser};

/// Create a member account
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = CreateMember,
    responses(
        (status = 201, description = "Member created", body = PublicUser),
        (status = 400, description = "Missing fields or username taken"),
        (status = 403, description = "Librarian role required")
    )
)]
pub async fn add_member(
    State(state): State<crate::AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
    Json(member): Json<CreateMember>,
) -> AppResult<(StatusCode, Json<PublicUser>)> {
    current.require_librarian()?;

    let created = state.services.users.add_member(member).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a member's username and/or password
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    request_body = UpdateMember,
    responses(
        (status = 200, description = "Member updated", body = PublicUser),
        (status = 400, description = "No fields supplied or username taken"),
        (status = 403, description = "Librarian role required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_member(
    State(state): State<crate::AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(update): Json<UpdateMember>,
) -> AppResult<Json<PublicUser>> {
    current.require_librarian()?;

    let updated = state.services.users.update_member(id, update).await?;
    Ok(Json(updated))
}

/// View a single member
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Member details", body = PublicUser),
        (status = 403, description = "Librarian role required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn view_member(
    State(state): State<crate::AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<PublicUser>> {
    current.require_librarian()?;

    let user = state.services.users.view_member(id).await?;
    Ok(Json(user))
}

/// Soft-delete a member account
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Member removed", body = MessageResponse),
        (status = 403, description = "Librarian role required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn remove_member(
    State(state): State<crate::AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<MessageResponse>> {
    current.require_librarian()?;

    state.services.users.remove_member(id).await?;
    Ok(Json(MessageResponse {
        message: "Member removed successfully".to_string(),
    }))
}

/// List accounts still marked active
#[utoipa::path(
    get,
    path = "/users/active",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active accounts", body = Vec<PublicUser>),
        (status = 403, description = "Librarian role required")
    )
)]
pub async fn view_active_members(
    State(state): State<crate::AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
) -> AppResult<Json<Vec<PublicUser>>> {
    current.require_librarian()?;

    let users = state.services.users.view_active_members().await?;
    Ok(Json(users))
}

/// List soft-deleted accounts
#[utoipa::path(
    get,
    path = "/users/deleted",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Deleted accounts", body = Vec<PublicUser>),
        (status = 403, description = "Librarian role required")
    )
)]
pub async fn view_deleted_members(
    State(state): State<crate::AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
) -> AppResult<Json<Vec<PublicUser>>> {
    current.require_librarian()?;

    let users = state.services.users.view_deleted_members().await?;
    Ok(Json(users))
}

/// Every loan record in the ledger
#[utoipa::path(
    get,
    path = "/users/history",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All loan records", body = Vec<BorrowRecord>),
        (status = 403, description = "Librarian role required")
    )
)]
pub async fn view_all_history(
    State(state): State<crate::AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowRecord>>> {
    current.require_librarian()?;

    let history = state.services.users.view_all_history().await?;
    Ok(Json(history))
}

/// The caller's own loan records
#[utoipa::path(
    get,
    path = "/users/history/own",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own loan records", body = Vec<BorrowRecord>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn view_own_history(
    State(state): State<crate::AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowRecord>>> {
    let history = state.services.users.view_own_history(current.id).await?;
    Ok(Json(history))
}

/// Soft-delete the caller's own account
#[utoipa::path(
    delete,
    path = "/users/own",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Account deleted", body = MessageResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn delete_own_account(
    State(state): State<crate::AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
) -> AppResult<Json<MessageResponse>> {
    state.services.users.delete_own_account(current.id).await?;
    Ok(Json(MessageResponse {
        message: "Account deleted successfully".to_string(),
    }))
}
