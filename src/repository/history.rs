//! Borrow history repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{BorrowHistory, NewBorrowHistory},
};

use super::HistoryStore;

#[derive(Clone)]
pub struct HistoryRepository {
    pool: Pool<Postgres>,
}

impl HistoryRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryStore for HistoryRepository {
    async fn append(&self, record: NewBorrowHistory) -> AppResult<BorrowHistory> {
        let result = sqlx::query_as::<_, BorrowHistory>(
            r#"
            INSERT INTO borrow_history (user_id, book_id, borrow_date, return_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, book_id, borrow_date, return_date
            "#,
        )
        .bind(record.user_id)
        .bind(record.book_id)
        .bind(record.period.from)
        .bind(record.period.to)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(row),
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                Err(AppError::NotFound(format!(
                    "User {} or book {} not found",
                    record.user_id, record.book_id
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_by_user(&self, user_id: i32) -> AppResult<Vec<BorrowHistory>> {
        let rows = sqlx::query_as::<_, BorrowHistory>(
            r#"
            SELECT id, user_id, book_id, borrow_date, return_date
            FROM borrow_history
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
