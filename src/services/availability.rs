//! Availability checks for borrow requests
//!
//! A book can be lent for a date range when it exists, has at least one
//! copy, and the approved requests overlapping the range leave room under the
//! configured [`AvailabilityPolicy`]. Pending and denied requests never
//! occupy a copy.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
    config::AvailabilityPolicy,
    error::{AppError, AppResult},
    models::{Book, BorrowRequest, DateRange, RequestStatus},
    repository::{CatalogStore, RequestLedger},
};

#[derive(Clone)]
pub struct AvailabilityChecker {
    books: Arc<dyn CatalogStore>,
    requests: Arc<dyn RequestLedger>,
    policy: AvailabilityPolicy,
}

impl AvailabilityChecker {
    pub fn new(
        books: Arc<dyn CatalogStore>,
        requests: Arc<dyn RequestLedger>,
        policy: AvailabilityPolicy,
    ) -> Self {
        Self {
            books,
            requests,
            policy,
        }
    }

    pub fn policy(&self) -> AvailabilityPolicy {
        self.policy
    }

    /// Validate raw `YYYY-MM-DD` input, then check the range
    pub async fn check_availability(
        &self,
        book_id: i32,
        date_from: &str,
        date_to: &str,
    ) -> AppResult<DateRange> {
        let range = DateRange::parse(date_from, date_to)?;
        self.check(book_id, range).await?;
        Ok(range)
    }

    /// Check that one more loan of `book_id` over `range` can be granted
    pub async fn check(&self, book_id: i32, range: DateRange) -> AppResult<Book> {
        let book = match self.books.get_book(book_id).await? {
            Some(book) if book.is_lendable() => book,
            _ => {
                tracing::debug!(book_id, "Book missing or without copies");
                return Err(AppError::BookUnavailable);
            }
        };

        let approved = self
            .requests
            .find_overlapping(book_id, RequestStatus::Approved, range)
            .await?;

        let blocked = match self.policy {
            AvailabilityPolicy::SingleOverlap => !approved.is_empty(),
            AvailabilityPolicy::PerCopy => peak_occupancy(range, &approved) >= book.copies as usize,
        };

        if blocked {
            tracing::debug!(
                book_id,
                from = %range.from,
                to = %range.to,
                conflicts = approved.len(),
                "Book already borrowed for given dates"
            );
            return Err(AppError::Unavailable);
        }

        Ok(book)
    }
}

/// Highest number of `requests` covering a single day inside `window`
pub fn peak_occupancy(window: DateRange, requests: &[BorrowRequest]) -> usize {
    // (day, delta): +1 when a loan starts, -1 on the day after it ends
    let mut events: Vec<(NaiveDate, i32)> = Vec::with_capacity(requests.len() * 2);
    for clipped in requests.iter().filter_map(|r| r.range().clip(&window)) {
        events.push((clipped.from, 1));
        if let Some(after) = clipped.to.succ_opt() {
            events.push((after, -1));
        }
    }
    events.sort();

    let mut current = 0i32;
    let mut peak = 0i32;
    for (_, delta) in events {
        current += delta;
        peak = peak.max(current);
    }
    peak as usize
}
