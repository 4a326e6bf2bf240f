//! Base repository traits following Interface Segregation Principle (ISP).
//!
//! `Repository<T>` is the capability set every persisted aggregate gets:
//! predicate-driven reads plus insert, update and delete. Narrower traits
//! extend it with aggregate-specific queries.

use async_trait::async_trait;

use crate::errors::AppResult;

/// Identity and filter contract for a persisted aggregate.
pub trait Persisted: Send + Sync + 'static {
    /// Identifier type assigned by the store
    type Id: Copy + Send + Sync;

    /// Predicate type the store can evaluate for this aggregate
    type Filter: Send + Sync;

    /// Current identifier
    fn id(&self) -> Self::Id;
}

/// Generic repository over a persisted aggregate.
#[async_trait]
pub trait Repository<T: Persisted>: Send + Sync {
    /// Check whether any record matches the filter
    async fn exists_by(&self, filter: T::Filter) -> AppResult<bool>;

    /// Fetch the first record matching the filter
    async fn get_one_by(&self, filter: T::Filter) -> AppResult<Option<T>>;

    /// Fetch every record matching the filter, or all records when `None`
    async fn get_all_by(&self, filter: Option<T::Filter>) -> AppResult<Vec<T>>;

    /// Count records matching the filter, or all records when `None`
    async fn count_by(&self, filter: Option<T::Filter>) -> AppResult<u64>;

    /// Insert a new record, returning it with its assigned identifier
    async fn insert(&self, entity: T) -> AppResult<T>;

    /// Replace an existing record
    async fn update(&self, entity: T) -> AppResult<T>;

    /// Remove a record
    async fn delete(&self, entity: T) -> AppResult<()>;
}
