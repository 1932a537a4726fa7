//! Repository layer: one store trait per entity, with Postgres and in-memory backends

pub mod books;
pub mod history;
pub mod memory;
pub mod requests;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        Book, BorrowHistory, BorrowRequest, DateRange, NewBorrowHistory, NewBorrowRequest,
        NewUser, RequestStatus, User,
    },
};

/// Read access to the book catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Cheap round trip to the backing store
    async fn ping(&self) -> AppResult<()>;
    async fn get_book(&self, id: i32) -> AppResult<Option<Book>>;
    async fn list_books(&self) -> AppResult<Vec<Book>>;
}

/// Authoritative collection of borrow requests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestLedger: Send + Sync {
    /// Requests on `book_id` in `status` whose range overlaps `range`
    async fn find_overlapping(
        &self,
        book_id: i32,
        status: RequestStatus,
        range: DateRange,
    ) -> AppResult<Vec<BorrowRequest>>;
    async fn get(&self, id: i32) -> AppResult<Option<BorrowRequest>>;
    async fn list_all(&self) -> AppResult<Vec<BorrowRequest>>;
    async fn list_by_user(&self, user_id: i32) -> AppResult<Vec<BorrowRequest>>;
    /// Insert a new `Pending` request
    async fn insert(&self, request: NewBorrowRequest) -> AppResult<BorrowRequest>;
    /// Move `id` from `from` to `to`; `None` when the row was not in `from`
    async fn update_status(
        &self,
        id: i32,
        from: RequestStatus,
        to: RequestStatus,
    ) -> AppResult<Option<BorrowRequest>>;
}

/// Append-only store of completed loans
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(&self, record: NewBorrowHistory) -> AppResult<BorrowHistory>;
    async fn list_by_user(&self, user_id: i32) -> AppResult<Vec<BorrowHistory>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, id: i32) -> AppResult<Option<User>>;
    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn create(&self, user: NewUser) -> AppResult<User>;
}

/// Main repository struct holding one handle per store
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn CatalogStore>,
    pub requests: Arc<dyn RequestLedger>,
    pub history: Arc<dyn HistoryStore>,
    pub users: Arc<dyn UserStore>,
}

impl Repository {
    /// Create a repository backed by the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: Arc::new(books::BooksRepository::new(pool.clone())),
            requests: Arc::new(requests::RequestsRepository::new(pool.clone())),
            history: Arc::new(history::HistoryRepository::new(pool.clone())),
            users: Arc::new(users::UsersRepository::new(pool)),
        }
    }

    /// Create a repository whose stores all live in process memory
    pub fn in_memory(store: memory::MemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            books: store.clone(),
            requests: store.clone(),
            history: store.clone(),
            users: store,
        }
    }
}
