//! Borrow history recording and export

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{
        history::HISTORY_EXPORT_FIELDS, ActorContext, BorrowHistory, DateRange, NewBorrowHistory,
    },
    repository::{CatalogStore, HistoryStore, UserStore},
};

/// Column titles for `HISTORY_EXPORT_FIELDS`
const CSV_HEADER: [&str; 4] = ["History ID", "Book ID", "Borrow Date", "Return Date"];

#[derive(Clone)]
pub struct HistoryService {
    history: Arc<dyn HistoryStore>,
    books: Arc<dyn CatalogStore>,
    users: Arc<dyn UserStore>,
}

impl HistoryService {
    pub fn new(
        history: Arc<dyn HistoryStore>,
        books: Arc<dyn CatalogStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            history,
            books,
            users,
        }
    }

    /// Record a completed loan
    pub async fn record(
        &self,
        actor: ActorContext,
        user_id: i32,
        book_id: i32,
        borrow_date: &str,
        return_date: &str,
    ) -> AppResult<BorrowHistory> {
        actor.require_librarian()?;

        let period = DateRange::parse(borrow_date, return_date)?;
        if self.books.get_book(book_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Book with id {} not found", book_id)));
        }
        if self.users.get(user_id).await?.is_none() {
            return Err(AppError::NotFound(format!("User with id {} not found", user_id)));
        }

        let record = self
            .history
            .append(NewBorrowHistory {
                user_id,
                book_id,
                period,
            })
            .await?;

        tracing::info!(
            history_id = record.id,
            user_id,
            book_id,
            librarian_id = actor.actor_id,
            "Loan recorded in history"
        );

        Ok(record)
    }

    pub async fn list_by_user(&self, user_id: i32) -> AppResult<Vec<BorrowHistory>> {
        self.history.list_by_user(user_id).await
    }

    /// Render `user_id`'s history as a CSV document
    pub async fn export_csv(&self, user_id: i32) -> AppResult<String> {
        let records = self.history.list_by_user(user_id).await?;
        Ok(render_csv(&records))
    }
}

/// Format history rows as CSV, one line per record after the header
pub fn render_csv(records: &[BorrowHistory]) -> String {
    debug_assert_eq!(CSV_HEADER.len(), HISTORY_EXPORT_FIELDS.len());

    let mut out = String::new();
    out.push_str(&CSV_HEADER.join(","));
    out.push_str("\r\n");
    for record in records {
        // ids and ISO dates never need quoting
        out.push_str(&record.export_values().join(","));
        out.push_str("\r\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::User,
        repository::{memory::MemoryStore, MockCatalogStore, MockHistoryStore, MockUserStore},
    };

    const LIBRARIAN: ActorContext = ActorContext {
        actor_id: 1,
        is_librarian: true,
    };

    fn setup() -> HistoryService {
        let store = Arc::new(MemoryStore::new());
        store.add_book("Dune", "Frank Herbert", "9780441013593", 1).unwrap();
        store.add_user("reader@example.org", "x", false).unwrap();
        store.add_user("other@example.org", "x", false).unwrap();
        HistoryService::new(store.clone(), store.clone(), store)
    }

    #[tokio::test]
    async fn test_record_and_list() {
        let service = setup();
        let record = service
            .record(LIBRARIAN, 1, 1, "2024-03-01", "2024-03-05")
            .await
            .unwrap();
        assert_eq!(record.user_id, 1);
        assert_eq!(record.borrow_date.to_string(), "2024-03-01");

        service.record(LIBRARIAN, 2, 1, "2024-04-01", "2024-04-02").await.unwrap();

        let mine = service.list_by_user(1).await.unwrap();
        assert_eq!(mine, vec![record]);
    }

    #[tokio::test]
    async fn test_record_validation() {
        let service = setup();
        assert!(matches!(
            service.record(ActorContext::patron(1), 1, 1, "2024-03-01", "2024-03-05").await,
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            service.record(LIBRARIAN, 1, 1, "2024-03-05", "2024-03-01").await,
            Err(AppError::InvalidRange)
        ));
        assert!(matches!(
            service.record(LIBRARIAN, 1, 99, "2024-03-01", "2024-03-05").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.record(LIBRARIAN, 42, 1, "2024-03-01", "2024-03-05").await,
            Err(AppError::NotFound(_))
        ));
        assert!(service.list_by_user(1).await.unwrap().is_empty());
        assert!(service.list_by_user(42).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_export_csv() {
        let service = setup();
        service.record(LIBRARIAN, 1, 1, "2024-03-01", "2024-03-05").await.unwrap();
        service.record(LIBRARIAN, 1, 1, "2024-05-10", "2024-05-12").await.unwrap();

        let csv = service.export_csv(1).await.unwrap();
        assert_eq!(
            csv,
            "History ID,Book ID,Borrow Date,Return Date\r\n\
             1,1,2024-03-01,2024-03-05\r\n\
             2,1,2024-05-10,2024-05-12\r\n"
        );
        assert_eq!(
            service.export_csv(2).await.unwrap(),
            "History ID,Book ID,Borrow Date,Return Date\r\n"
        );
    }

    #[tokio::test]
    async fn test_append_failure_is_store_failure() {
        let mut books = MockCatalogStore::new();
        books.expect_get_book().returning(|id| {
            Ok(Some(crate::models::Book {
                id,
                title: "Dune".into(),
                author: "Frank Herbert".into(),
                isbn: "9780441013593".into(),
                copies: 1,
            }))
        });
        let mut history = MockHistoryStore::new();
        history
            .expect_append()
            .returning(|_| Err(sqlx::Error::PoolClosed.into()));

        let mut users = MockUserStore::new();
        users.expect_get().returning(|id| {
            Ok(Some(User {
                id,
                email: "reader@example.org".into(),
                password: String::new(),
                is_librarian: false,
            }))
        });

        let service = HistoryService::new(Arc::new(history), Arc::new(books), Arc::new(users));
        assert!(matches!(
            service.record(LIBRARIAN, 1, 1, "2024-03-01", "2024-03-05").await,
            Err(AppError::StoreFailure { .. })
        ));
    }
}
