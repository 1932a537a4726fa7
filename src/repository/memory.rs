//! In-process stores, used by tests and local demos

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::{
    error::{AppError, AppResult},
    models::{
        Book, BorrowHistory, BorrowRequest, DateRange, NewBorrowHistory, NewBorrowRequest,
        NewUser, RequestStatus, User,
    },
};

use super::{CatalogStore, HistoryStore, RequestLedger, UserStore};

#[derive(Default)]
struct Tables {
    books: Vec<Book>,
    requests: Vec<BorrowRequest>,
    history: Vec<BorrowHistory>,
    users: Vec<User>,
}

/// All four tables behind one lock; ids are assigned sequentially from 1
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a catalog entry; the catalog is otherwise read-only
    pub fn add_book(&self, title: &str, author: &str, isbn: &str, copies: i32) -> AppResult<Book> {
        let mut tables = self.write()?;
        let book = Book {
            id: tables.books.len() as i32 + 1,
            title: title.to_string(),
            author: author.to_string(),
            isbn: isbn.to_string(),
            copies,
        };
        tables.books.push(book.clone());
        Ok(book)
    }

    /// Seed an account directly, bypassing password hashing
    pub fn add_user(&self, email: &str, password_hash: &str, is_librarian: bool) -> AppResult<User> {
        let mut tables = self.write()?;
        let user = User {
            id: tables.users.len() as i32 + 1,
            email: email.to_string(),
            password: password_hash.to_string(),
            is_librarian,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| AppError::Internal("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| AppError::Internal("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        self.read().map(|_| ())
    }

    async fn get_book(&self, id: i32) -> AppResult<Option<Book>> {
        Ok(self.read()?.books.iter().find(|b| b.id == id).cloned())
    }

    async fn list_books(&self) -> AppResult<Vec<Book>> {
        let mut books = self.read()?.books.clone();
        books.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(books)
    }
}

#[async_trait]
impl RequestLedger for MemoryStore {
    async fn find_overlapping(
        &self,
        book_id: i32,
        status: RequestStatus,
        range: DateRange,
    ) -> AppResult<Vec<BorrowRequest>> {
        let tables = self.read()?;
        let mut found: Vec<BorrowRequest> = tables
            .requests
            .iter()
            .filter(|r| r.book_id == book_id && r.status == status && r.range().overlaps(&range))
            .cloned()
            .collect();
        found.sort_by_key(|r| (r.date_from, r.id));
        Ok(found)
    }

    async fn get(&self, id: i32) -> AppResult<Option<BorrowRequest>> {
        Ok(self.read()?.requests.iter().find(|r| r.id == id).cloned())
    }

    async fn list_all(&self) -> AppResult<Vec<BorrowRequest>> {
        Ok(self.read()?.requests.clone())
    }

    async fn list_by_user(&self, user_id: i32) -> AppResult<Vec<BorrowRequest>> {
        Ok(self
            .read()?
            .requests
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert(&self, request: NewBorrowRequest) -> AppResult<BorrowRequest> {
        let mut tables = self.write()?;
        let row = BorrowRequest {
            id: tables.requests.len() as i32 + 1,
            user_id: request.user_id,
            book_id: request.book_id,
            date_from: request.range.from,
            date_to: request.range.to,
            status: RequestStatus::Pending,
            created_at: request.created_at,
        };
        tables.requests.push(row.clone());
        Ok(row)
    }

    async fn update_status(
        &self,
        id: i32,
        from: RequestStatus,
        to: RequestStatus,
    ) -> AppResult<Option<BorrowRequest>> {
        let mut tables = self.write()?;
        match tables
            .requests
            .iter_mut()
            .find(|r| r.id == id && r.status == from)
        {
            Some(row) => {
                row.status = to;
                Ok(Some(row.clone()))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl HistoryStore for MemoryStore {
    async fn append(&self, record: NewBorrowHistory) -> AppResult<BorrowHistory> {
        let mut tables = self.write()?;
        let row = BorrowHistory {
            id: tables.history.len() as i32 + 1,
            user_id: record.user_id,
            book_id: record.book_id,
            borrow_date: record.period.from,
            return_date: record.period.to,
        };
        tables.history.push(row.clone());
        Ok(row)
    }

    async fn list_by_user(&self, user_id: i32) -> AppResult<Vec<BorrowHistory>> {
        Ok(self
            .read()?
            .history
            .iter()
            .filter(|h| h.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get(&self, id: i32) -> AppResult<Option<User>> {
        Ok(self.read()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .read()?
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create(&self, user: NewUser) -> AppResult<User> {
        let mut tables = self.write()?;
        if tables.users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(AppError::Conflict(format!(
                "A user with email {} already exists",
                user.email
            )));
        }
        let row = User {
            id: tables.users.len() as i32 + 1,
            email: user.email,
            password: user.password_hash,
            is_librarian: user.is_librarian,
        };
        tables.users.push(row.clone());
        Ok(row)
    }
}
