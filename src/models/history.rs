//! Borrow history model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::borrow_request::DateRange;

/// Completed loan; never modified once recorded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowHistory {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub borrow_date: NaiveDate,
    pub return_date: NaiveDate,
}

/// Fields handed to the export formatter, in column order
pub const HISTORY_EXPORT_FIELDS: [&str; 4] = ["id", "book_id", "borrow_date", "return_date"];

impl BorrowHistory {
    /// Values for `HISTORY_EXPORT_FIELDS`, in the same order
    pub fn export_values(&self) -> [String; 4] {
        [
            self.id.to_string(),
            self.book_id.to_string(),
            self.borrow_date.to_string(),
            self.return_date.to_string(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBorrowHistory {
    pub user_id: i32,
    pub book_id: i32,
    pub period: DateRange,
}
