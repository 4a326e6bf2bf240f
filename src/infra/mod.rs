//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections, migrations and repositories
//! - Unit of Work for transaction management

pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use repositories::{AccountRepository, AccountStore, Persisted, Repository};
pub use unit_of_work::{Persistence, ScopedUnitOfWork, TransactionScope, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::MockAccounts;
#[cfg(any(test, feature = "test-utils"))]
pub use unit_of_work::MockUnitOfWork;
