//! Data models for Bookloan

pub mod book;
pub mod borrow_request;
pub mod history;
pub mod user;

// Re-export commonly used types
pub use book::Book;
pub use borrow_request::{BorrowRequest, DateRange, NewBorrowRequest, RequestStatus};
pub use history::{BorrowHistory, NewBorrowHistory};
pub use user::{ActorContext, NewUser, User, UserClaims};
