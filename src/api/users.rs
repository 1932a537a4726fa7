//! User management endpoints (librarians only)

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::user::{CreateUser, User},
};

use super::{extract::JsonBody, AuthenticatedUser};

/// Create a new user
#[utoipa::path(
    post,
    path = "/librarian/users",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Not a librarian"),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn create_user(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    JsonBody(request): JsonBody<CreateUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    let created = state.services.users.create_user(user.actor(), request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
