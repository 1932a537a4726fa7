//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, borrows, health, history, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookloan API",
        version = "1.0.0",
        description = "Library loan request and availability REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        // Users
        users::create_user,
        // Books
        books::list_books,
        books::check_availability,
        // Borrows
        borrows::borrow_book,
        borrows::list_requests,
        borrows::get_request,
        borrows::update_request,
        borrows::my_requests,
        // History
        history::record_history,
        history::user_history,
        history::download_user_history,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            // Users
            crate::models::user::User,
            crate::models::user::CreateUser,
            // Books
            crate::models::Book,
            books::AvailabilityQuery,
            books::AvailabilityResponse,
            // Borrows
            crate::models::BorrowRequest,
            crate::models::RequestStatus,
            borrows::BorrowBookRequest,
            borrows::BorrowResponse,
            borrows::UpdateRequestStatus,
            // History
            crate::models::BorrowHistory,
            history::RecordHistoryRequest,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "User management"),
        (name = "books", description = "Catalog and availability"),
        (name = "borrows", description = "Borrow request lifecycle"),
        (name = "history", description = "Completed loans")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
