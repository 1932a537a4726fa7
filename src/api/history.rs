//! Borrow history endpoints

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{error::AppResult, models::BorrowHistory};

use super::{extract::JsonBody, AuthenticatedUser};

/// Completed loan reported by a librarian
#[derive(Deserialize, ToSchema)]
pub struct RecordHistoryRequest {
    pub user_id: i32,
    pub book_id: i32,
    /// YYYY-MM-DD
    pub borrow_date: String,
    /// YYYY-MM-DD
    pub return_date: String,
}

/// Record a completed loan
#[utoipa::path(
    post,
    path = "/librarian/history",
    tag = "history",
    security(("bearer_auth" = [])),
    request_body = RecordHistoryRequest,
    responses(
        (status = 201, description = "Loan recorded", body = BorrowHistory),
        (status = 400, description = "Invalid dates"),
        (status = 403, description = "Not a librarian"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn record_history(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    JsonBody(request): JsonBody<RecordHistoryRequest>,
) -> AppResult<(StatusCode, Json<BorrowHistory>)> {
    let record = state
        .services
        .history
        .record(
            user.actor(),
            request.user_id,
            request.book_id,
            &request.borrow_date,
            &request.return_date,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Caller's borrow history
#[utoipa::path(
    get,
    path = "/user/history",
    tag = "history",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Completed loans", body = Vec<BorrowHistory>)
    )
)]
pub async fn user_history(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowHistory>>> {
    let history = state.services.history.list_by_user(user.actor().actor_id).await?;
    Ok(Json(history))
}

/// Download the caller's borrow history as CSV
#[utoipa::path(
    get,
    path = "/user/history/download",
    tag = "history",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "CSV attachment", content_type = "text/csv", body = String)
    )
)]
pub async fn download_user_history(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
) -> AppResult<impl IntoResponse> {
    let csv = state.services.history.export_csv(user.actor().actor_id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment;filename=borrow_history.csv",
            ),
        ],
        csv,
    ))
}
