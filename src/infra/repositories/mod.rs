//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

mod account_repository;
mod base;
pub(crate) mod entities;

pub use account_repository::{AccountRepository, AccountStore};
pub use base::{Persisted, Repository};

// Export mock for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use account_repository::MockAccounts;
