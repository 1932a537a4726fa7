//! Business logic services

pub mod availability;
pub mod borrows;
pub mod catalog;
pub mod history;
pub mod users;

use crate::{
    config::{AuthConfig, LoansConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub availability: availability::AvailabilityChecker,
    pub borrows: borrows::BorrowService,
    pub catalog: catalog::CatalogService,
    pub history: history::HistoryService,
    pub users: users::UsersService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig, loans_config: &LoansConfig) -> Self {
        let availability = availability::AvailabilityChecker::new(
            repository.books.clone(),
            repository.requests.clone(),
            loans_config.availability_policy,
        );

        Self {
            borrows: borrows::BorrowService::new(
                repository.requests.clone(),
                availability.clone(),
                loans_config,
            ),
            availability,
            catalog: catalog::CatalogService::new(repository.books.clone()),
            history: history::HistoryService::new(
                repository.history.clone(),
                repository.books,
                repository.users.clone(),
            ),
            users: users::UsersService::new(repository.users, auth_config),
        }
    }
}
