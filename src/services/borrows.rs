//! Borrow request lifecycle
//!
//! Requests are created `Pending` after an availability check and resolved
//! once by a librarian to `Approved` or `Denied`.

use std::sync::Arc;

use chrono::Utc;

use crate::{
    config::LoansConfig,
    error::{AppError, AppResult},
    models::{ActorContext, BorrowRequest, NewBorrowRequest, RequestStatus},
    repository::RequestLedger,
};

use super::availability::AvailabilityChecker;

#[derive(Clone)]
pub struct BorrowService {
    requests: Arc<dyn RequestLedger>,
    checker: AvailabilityChecker,
    recheck_on_approval: bool,
}

impl BorrowService {
    pub fn new(
        requests: Arc<dyn RequestLedger>,
        checker: AvailabilityChecker,
        config: &LoansConfig,
    ) -> Self {
        Self {
            requests,
            checker,
            recheck_on_approval: config.recheck_on_approval,
        }
    }

    /// Submit a borrow request for `actor`; returns the new request id
    pub async fn create(
        &self,
        actor: ActorContext,
        book_id: i32,
        date_from: &str,
        date_to: &str,
    ) -> AppResult<i32> {
        let range = self
            .checker
            .check_availability(book_id, date_from, date_to)
            .await?;

        let created = self
            .requests
            .insert(NewBorrowRequest {
                user_id: actor.actor_id,
                book_id,
                range,
                created_at: Utc::now(),
            })
            .await?;

        tracing::info!(
            request_id = created.id,
            user_id = created.user_id,
            book_id,
            from = %range.from,
            to = %range.to,
            "Borrow request submitted"
        );

        Ok(created.id)
    }

    /// Resolve a pending request to `Approved` or `Denied`
    pub async fn transition(
        &self,
        request_id: i32,
        new_status: &str,
        actor: ActorContext,
    ) -> AppResult<BorrowRequest> {
        actor.require_librarian()?;

        let request = self.get(request_id).await?;
        let target = RequestStatus::parse_target(new_status)?;

        if !request.status.can_transition_to(target) {
            return Err(AppError::InvalidTransition(format!(
                "Request {} is already {}",
                request_id, request.status
            )));
        }

        if target == RequestStatus::Approved && self.recheck_on_approval {
            self.checker.check(request.book_id, request.range()).await?;
        }

        let updated = self
            .requests
            .update_status(request_id, RequestStatus::Pending, target)
            .await?
            .ok_or_else(|| {
                AppError::InvalidTransition(format!(
                    "Request {} was resolved concurrently",
                    request_id
                ))
            })?;

        tracing::info!(
            request_id,
            librarian_id = actor.actor_id,
            status = %updated.status,
            "Borrow request updated"
        );

        Ok(updated)
    }

    pub async fn get(&self, request_id: i32) -> AppResult<BorrowRequest> {
        self.requests
            .get(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Request not found".to_string()))
    }

    /// Every request in the ledger (librarian view)
    pub async fn list_all(&self, actor: ActorContext) -> AppResult<Vec<BorrowRequest>> {
        actor.require_librarian()?;
        self.requests.list_all().await
    }

    /// Requests submitted by `actor`
    pub async fn list_mine(&self, actor: ActorContext) -> AppResult<Vec<BorrowRequest>> {
        self.requests.list_by_user(actor.actor_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AvailabilityPolicy,
        models::DateRange,
        repository::{memory::MemoryStore, MockRequestLedger},
    };

    const PATRON: ActorContext = ActorContext {
        actor_id: 10,
        is_librarian: false,
    };
    const OTHER_PATRON: ActorContext = ActorContext {
        actor_id: 11,
        is_librarian: false,
    };
    const LIBRARIAN: ActorContext = ActorContext {
        actor_id: 1,
        is_librarian: true,
    };

    fn service_with(store: Arc<MemoryStore>, config: LoansConfig) -> BorrowService {
        let checker = AvailabilityChecker::new(
            store.clone(),
            store.clone(),
            config.availability_policy,
        );
        BorrowService::new(store, checker, &config)
    }

    fn setup(copies: i32) -> (Arc<MemoryStore>, BorrowService) {
        let store = Arc::new(MemoryStore::new());
        store.add_book("Dune", "Frank Herbert", "9780441013593", copies).unwrap();
        let service = service_with(store.clone(), LoansConfig::default());
        (store, service)
    }

    #[tokio::test]
    async fn test_create_starts_pending() {
        let (_, service) = setup(1);
        let id = service.create(PATRON, 1, "2024-03-01", "2024-03-05").await.unwrap();

        let request = service.get(id).await.unwrap();
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.user_id, PATRON.actor_id);
        assert_eq!(request.book_id, 1);
        assert_eq!(request.range(), DateRange::parse("2024-03-01", "2024-03-05").unwrap());
    }

    #[tokio::test]
    async fn test_inverted_range_persists_nothing() {
        let (store, service) = setup(1);
        let result = service.create(PATRON, 1, "2024-03-05", "2024-03-01").await;
        assert!(matches!(result, Err(AppError::InvalidRange)));
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_book_without_copies_is_rejected() {
        let (store, service) = setup(0);
        let result = service.create(PATRON, 1, "2024-03-01", "2024-03-05").await;
        assert!(matches!(result, Err(AppError::BookUnavailable)));
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pending_and_denied_never_block() {
        let (_, service) = setup(1);
        let pending = service.create(PATRON, 1, "2024-01-10", "2024-01-20").await.unwrap();
        let denied = service.create(OTHER_PATRON, 1, "2024-01-12", "2024-01-18").await.unwrap();
        service.transition(denied, "Denied", LIBRARIAN).await.unwrap();

        assert!(service.create(OTHER_PATRON, 1, "2024-01-15", "2024-01-25").await.is_ok());
        assert_eq!(service.get(pending).await.unwrap().status, RequestStatus::Pending);
    }

    #[tokio::test]
    async fn test_approved_request_blocks_overlap_only() {
        let (_, service) = setup(1);
        let id = service.create(PATRON, 1, "2024-01-10", "2024-01-20").await.unwrap();
        service.transition(id, "Approved", LIBRARIAN).await.unwrap();

        assert!(matches!(
            service.create(OTHER_PATRON, 1, "2024-01-15", "2024-01-25").await,
            Err(AppError::Unavailable)
        ));
        assert!(service.create(OTHER_PATRON, 1, "2024-01-21", "2024-01-25").await.is_ok());
    }

    #[tokio::test]
    async fn test_terminal_states_reject_any_transition() {
        let (_, service) = setup(1);
        let approved = service.create(PATRON, 1, "2024-01-01", "2024-01-02").await.unwrap();
        service.transition(approved, "Approved", LIBRARIAN).await.unwrap();
        let denied = service.create(PATRON, 1, "2024-02-01", "2024-02-02").await.unwrap();
        service.transition(denied, "Denied", LIBRARIAN).await.unwrap();

        for id in [approved, denied] {
            for target in ["Approved", "Denied"] {
                assert!(matches!(
                    service.transition(id, target, LIBRARIAN).await,
                    Err(AppError::InvalidTransition(_))
                ));
            }
        }
        assert_eq!(service.get(approved).await.unwrap().status, RequestStatus::Approved);
        assert_eq!(service.get(denied).await.unwrap().status, RequestStatus::Denied);
    }

    #[tokio::test]
    async fn test_invalid_status_leaves_ledger_unchanged() {
        let (_, service) = setup(1);
        let id = service.create(PATRON, 1, "2024-01-01", "2024-01-02").await.unwrap();
        let before = service.get(id).await.unwrap();

        for target in ["Maybe", "Pending", ""] {
            assert!(matches!(
                service.transition(id, target, LIBRARIAN).await,
                Err(AppError::InvalidStatus(_))
            ));
        }
        assert_eq!(service.get(id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_transition_checks_order() {
        let (_, service) = setup(1);
        let id = service.create(PATRON, 1, "2024-01-01", "2024-01-02").await.unwrap();

        assert!(matches!(
            service.transition(id, "Approved", PATRON).await,
            Err(AppError::Unauthorized(_))
        ));
        // Unknown id is reported before the bogus status
        assert!(matches!(
            service.transition(999, "Maybe", LIBRARIAN).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(service.get(id).await.unwrap().status, RequestStatus::Pending);
    }

    #[tokio::test]
    async fn test_get_is_idempotent() {
        let (_, service) = setup(1);
        let id = service.create(PATRON, 1, "2024-01-01", "2024-01-02").await.unwrap();
        assert_eq!(service.get(id).await.unwrap(), service.get(id).await.unwrap());
        assert!(matches!(service.get(404).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_approval_recheck_rejects_conflicting_pending() {
        let (_, service) = setup(1);
        // Both pass the creation check while nothing is approved yet
        let first = service.create(PATRON, 1, "2024-03-01", "2024-03-05").await.unwrap();
        let second = service.create(OTHER_PATRON, 1, "2024-03-03", "2024-03-04").await.unwrap();

        service.transition(first, "Approved", LIBRARIAN).await.unwrap();
        assert!(matches!(
            service.transition(second, "Approved", LIBRARIAN).await,
            Err(AppError::Unavailable)
        ));
        assert_eq!(service.get(second).await.unwrap().status, RequestStatus::Pending);
        // Denial needs no availability
        service.transition(second, "Denied", LIBRARIAN).await.unwrap();
    }

    #[tokio::test]
    async fn test_per_copy_approval_recheck_counts_copies() {
        let store = Arc::new(MemoryStore::new());
        store.add_book("Dune", "Frank Herbert", "9780441013593", 2).unwrap();
        let service = service_with(
            store.clone(),
            LoansConfig {
                availability_policy: AvailabilityPolicy::PerCopy,
                recheck_on_approval: true,
            },
        );

        let first = service.create(PATRON, 1, "2024-03-01", "2024-03-05").await.unwrap();
        let second = service.create(OTHER_PATRON, 1, "2024-03-03", "2024-03-04").await.unwrap();
        let third = service.create(PATRON, 1, "2024-03-04", "2024-03-06").await.unwrap();

        service.transition(first, "Approved", LIBRARIAN).await.unwrap();
        // One copy is still free over 03..04
        let approved = service.transition(second, "Approved", LIBRARIAN).await.unwrap();
        assert_eq!(approved.status, RequestStatus::Approved);

        // Both copies are out on the 4th
        assert!(matches!(
            service.transition(third, "Approved", LIBRARIAN).await,
            Err(AppError::Unavailable)
        ));
        assert_eq!(service.get(third).await.unwrap().status, RequestStatus::Pending);
    }

    #[tokio::test]
    async fn test_approval_without_recheck_allows_double_booking() {
        let store = Arc::new(MemoryStore::new());
        store.add_book("Dune", "Frank Herbert", "9780441013593", 1).unwrap();
        let service = service_with(
            store.clone(),
            LoansConfig {
                availability_policy: AvailabilityPolicy::SingleOverlap,
                recheck_on_approval: false,
            },
        );

        let first = service.create(PATRON, 1, "2024-03-01", "2024-03-05").await.unwrap();
        let second = service.create(OTHER_PATRON, 1, "2024-03-03", "2024-03-04").await.unwrap();
        service.transition(first, "Approved", LIBRARIAN).await.unwrap();
        service.transition(second, "Approved", LIBRARIAN).await.unwrap();

        assert_eq!(service.get(second).await.unwrap().status, RequestStatus::Approved);
    }

    #[tokio::test]
    async fn test_listing() {
        let (_, service) = setup(1);
        service.create(PATRON, 1, "2024-01-01", "2024-01-02").await.unwrap();
        service.create(OTHER_PATRON, 1, "2024-01-03", "2024-01-04").await.unwrap();
        service.create(PATRON, 1, "2024-01-05", "2024-01-06").await.unwrap();

        assert_eq!(service.list_all(LIBRARIAN).await.unwrap().len(), 3);
        assert!(matches!(service.list_all(PATRON).await, Err(AppError::Unauthorized(_))));

        let mine = service.list_mine(PATRON).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|r| r.user_id == PATRON.actor_id));
    }

    #[tokio::test]
    async fn test_lost_race_is_invalid_transition() {
        let store = Arc::new(MemoryStore::new());
        store.add_book("Dune", "Frank Herbert", "9780441013593", 1).unwrap();
        let checker = AvailabilityChecker::new(
            store.clone(),
            store.clone(),
            AvailabilityPolicy::SingleOverlap,
        );

        let mut ledger = MockRequestLedger::new();
        let pending = BorrowRequest {
            id: 5,
            user_id: PATRON.actor_id,
            book_id: 1,
            date_from: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            date_to: chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            status: RequestStatus::Pending,
            created_at: Utc::now(),
        };
        ledger.expect_get().returning(move |_| Ok(Some(pending.clone())));
        ledger.expect_update_status().returning(|_, _, _| Ok(None));

        let service = BorrowService::new(Arc::new(ledger), checker, &LoansConfig::default());
        assert!(matches!(
            service.transition(5, "Denied", LIBRARIAN).await,
            Err(AppError::InvalidTransition(_))
        ));
    }

    #[tokio::test]
    async fn test_store_failure_on_insert() {
        let store = Arc::new(MemoryStore::new());
        store.add_book("Dune", "Frank Herbert", "9780441013593", 1).unwrap();
        let checker = AvailabilityChecker::new(
            store.clone(),
            store.clone(),
            AvailabilityPolicy::SingleOverlap,
        );

        let mut ledger = MockRequestLedger::new();
        ledger
            .expect_insert()
            .returning(|_| Err(sqlx::Error::PoolTimedOut.into()));

        let service = BorrowService::new(Arc::new(ledger), checker, &LoansConfig::default());
        assert!(matches!(
            service.create(PATRON, 1, "2024-01-01", "2024-01-02").await,
            Err(AppError::StoreFailure { .. })
        ));
    }
}
