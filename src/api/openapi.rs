//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, health, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Biblio API",
        version = "0.1.0",
        description = "Library Lending REST API",
        license(name = "MIT")
    ),
    servers(
        (url = "/api", description = "API root")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::signup,
        auth::login,
        auth::me,
        // Books
        books::list_books,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::borrow_book,
        books::return_book,
        // Users
        users::add_member,
        users::update_member,
        users::view_member,
        users::remove_member,
        users::view_active_members,
        users::view_deleted_members,
        users::view_all_history,
        users::view_own_history,
        users::delete_own_account,
    ),
    components(
        schemas(
            // Auth
            auth::SignupRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            // Books
            crate::models::book::Book,
            crate::models::book::BookStatus,
            crate::models::book::BookInput,
            books::MessageResponse,
            // Users
            crate::models::user::Role,
            crate::models::user::PublicUser,
            crate::models::user::CurrentUser,
            crate::models::user::CreateMember,
            crate::models::user::UpdateMember,
            // History
            crate::models::history::BorrowRecord,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "books", description = "Catalog and borrow/return"),
        (name = "users", description = "Member accounts and loan history")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
