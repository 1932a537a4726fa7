//! Borrow request endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::BorrowRequest,
};

use super::{
    extract::{JsonBody, PathParam},
    AuthenticatedUser,
};

/// Borrow request submitted by a patron
#[derive(Deserialize, ToSchema)]
pub struct BorrowBookRequest {
    pub book_id: Option<i32>,
    /// First day (YYYY-MM-DD)
    #[serde(default)]
    pub date_from: String,
    /// Last day, inclusive (YYYY-MM-DD)
    #[serde(default)]
    pub date_to: String,
}

#[derive(Serialize, ToSchema)]
pub struct BorrowResponse {
    /// New request ID
    pub id: i32,
    pub message: String,
}

/// Status change requested by a librarian
#[derive(Deserialize, ToSchema)]
pub struct UpdateRequestStatus {
    /// `Approved` or `Denied`
    #[serde(default)]
    pub status: String,
}

/// Submit a borrow request
#[utoipa::path(
    post,
    path = "/borrow",
    tag = "borrows",
    security(("bearer_auth" = [])),
    request_body = BorrowBookRequest,
    responses(
        (status = 201, description = "Request submitted", body = BorrowResponse),
        (status = 400, description = "Invalid input or date range"),
        (status = 409, description = "Book already borrowed for given dates"),
        (status = 422, description = "Book unavailable")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    JsonBody(request): JsonBody<BorrowBookRequest>,
) -> AppResult<(StatusCode, Json<BorrowResponse>)> {
    let book_id = request
        .book_id
        .ok_or_else(|| AppError::InvalidInput("book_id is required".to_string()))?;

    let id = state
        .services
        .borrows
        .create(user.actor(), book_id, &request.date_from, &request.date_to)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BorrowResponse {
            id,
            message: "Borrow request submitted".to_string(),
        }),
    ))
}

/// List every borrow request
#[utoipa::path(
    get,
    path = "/librarian/requests",
    tag = "borrows",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All requests", body = Vec<BorrowRequest>),
        (status = 403, description = "Not a librarian")
    )
)]
pub async fn list_requests(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowRequest>>> {
    let requests = state.services.borrows.list_all(user.actor()).await?;
    Ok(Json(requests))
}

/// Get one borrow request
#[utoipa::path(
    get,
    path = "/librarian/requests/{id}",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request", body = BorrowRequest),
        (status = 403, description = "Not a librarian"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn get_request(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    PathParam(request_id): PathParam<i32>,
) -> AppResult<Json<BorrowRequest>> {
    user.actor().require_librarian()?;
    let request = state.services.borrows.get(request_id).await?;
    Ok(Json(request))
}

/// Approve or deny a pending borrow request
#[utoipa::path(
    patch,
    path = "/librarian/requests/{id}",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Request ID")
    ),
    request_body = UpdateRequestStatus,
    responses(
        (status = 200, description = "Request updated", body = BorrowRequest),
        (status = 400, description = "Invalid status"),
        (status = 403, description = "Not a librarian"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is not pending, or approving would double-book")
    )
)]
pub async fn update_request(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    PathParam(request_id): PathParam<i32>,
    JsonBody(request): JsonBody<UpdateRequestStatus>,
) -> AppResult<Json<BorrowRequest>> {
    let updated = state
        .services
        .borrows
        .transition(request_id, &request.status, user.actor())
        .await?;
    Ok(Json(updated))
}

/// List the caller's own borrow requests
#[utoipa::path(
    get,
    path = "/user/requests",
    tag = "borrows",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's requests", body = Vec<BorrowRequest>)
    )
)]
pub async fn my_requests(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowRequest>>> {
    let requests = state.services.borrows.list_mine(user.actor()).await?;
    Ok(Json(requests))
}
