//! Catalog read service

use std::sync::Arc;

use crate::{
    error::AppResult,
    models::Book,
    repository::CatalogStore,
};

#[derive(Clone)]
pub struct CatalogService {
    books: Arc<dyn CatalogStore>,
}

impl CatalogService {
    pub fn new(books: Arc<dyn CatalogStore>) -> Self {
        Self { books }
    }

    pub async fn ping(&self) -> AppResult<()> {
        self.books.ping().await
    }

    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.books.list_books().await
    }
}
