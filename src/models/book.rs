//! Book (catalog) model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Catalog book; `copies` is the total number of physical units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub copies: i32,
}

impl Book {
    pub fn is_lendable(&self) -> bool {
        self.copies >= 1
    }
}
