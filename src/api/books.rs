//! Catalog endpoints

use axum::{
    extract::State,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::{AppError, AppResult},
    models::Book,
};

use super::{
    extract::{PathParam, QueryParams},
    AuthenticatedUser,
};

/// List all books
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Catalog", body = Vec<Book>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.catalog.list_books().await?;
    Ok(Json(books))
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct AvailabilityQuery {
    /// First day (YYYY-MM-DD)
    pub date_from: String,
    /// Last day, inclusive (YYYY-MM-DD)
    pub date_to: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AvailabilityResponse {
    pub book_id: i32,
    pub date_from: String,
    pub date_to: String,
    pub available: bool,
    /// Why the book cannot be lent, when `available` is false
    pub reason: Option<String>,
}

/// Check whether a book could be borrowed for a date range
#[utoipa::path(
    get,
    path = "/books/{id}/availability",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID"),
        AvailabilityQuery
    ),
    responses(
        (status = 200, description = "Availability verdict", body = AvailabilityResponse),
        (status = 400, description = "Invalid dates")
    )
)]
pub async fn check_availability(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser,
    PathParam(book_id): PathParam<i32>,
    QueryParams(query): QueryParams<AvailabilityQuery>,
) -> AppResult<Json<AvailabilityResponse>> {
    let verdict = state
        .services
        .availability
        .check_availability(book_id, &query.date_from, &query.date_to)
        .await;

    let reason = match verdict {
        Ok(_) => None,
        Err(e @ (AppError::Unavailable | AppError::BookUnavailable)) => Some(e.to_string()),
        Err(e) => return Err(e),
    };

    Ok(Json(AvailabilityResponse {
        book_id,
        date_from: query.date_from,
        date_to: query.date_to,
        available: reason.is_none(),
        reason,
    }))
}
