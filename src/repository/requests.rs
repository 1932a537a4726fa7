//! Borrow request ledger backed by Postgres

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{BorrowRequest, DateRange, NewBorrowRequest, RequestStatus},
};

use super::RequestLedger;

const COLUMNS: &str = "id, user_id, book_id, date_from, date_to, status, created_at";

#[derive(Clone)]
pub struct RequestsRepository {
    pool: Pool<Postgres>,
}

impl RequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RequestLedger for RequestsRepository {
    /// Single statement, so the check sees one snapshot of approved requests
    async fn find_overlapping(
        &self,
        book_id: i32,
        status: RequestStatus,
        range: DateRange,
    ) -> AppResult<Vec<BorrowRequest>> {
        let rows = sqlx::query_as::<_, BorrowRequest>(&format!(
            r#"
            SELECT {COLUMNS} FROM borrow_requests
            WHERE book_id = $1
              AND status = $2
              AND date_from <= $4
              AND $3 <= date_to
            ORDER BY date_from, id
            "#
        ))
        .bind(book_id)
        .bind(status)
        .bind(range.from)
        .bind(range.to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn get(&self, id: i32) -> AppResult<Option<BorrowRequest>> {
        let row = sqlx::query_as::<_, BorrowRequest>(&format!(
            "SELECT {COLUMNS} FROM borrow_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_all(&self) -> AppResult<Vec<BorrowRequest>> {
        let rows = sqlx::query_as::<_, BorrowRequest>(&format!(
            "SELECT {COLUMNS} FROM borrow_requests ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn list_by_user(&self, user_id: i32) -> AppResult<Vec<BorrowRequest>> {
        let rows = sqlx::query_as::<_, BorrowRequest>(&format!(
            "SELECT {COLUMNS} FROM borrow_requests WHERE user_id = $1 ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn insert(&self, request: NewBorrowRequest) -> AppResult<BorrowRequest> {
        let row = sqlx::query_as::<_, BorrowRequest>(&format!(
            r#"
            INSERT INTO borrow_requests (user_id, book_id, date_from, date_to, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(request.user_id)
        .bind(request.book_id)
        .bind(request.range.from)
        .bind(request.range.to)
        .bind(RequestStatus::Pending)
        .bind(request.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update_status(
        &self,
        id: i32,
        from: RequestStatus,
        to: RequestStatus,
    ) -> AppResult<Option<BorrowRequest>> {
        let row = sqlx::query_as::<_, BorrowRequest>(&format!(
            r#"
            UPDATE borrow_requests SET status = $3
            WHERE id = $1 AND status = $2
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}
