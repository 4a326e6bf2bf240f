//! Unit of Work pattern implementation.
//!
//! SOLID (SRP): Manages transaction lifecycle for one service-call scope.
//! DDD: Every write of a scope commits or rolls back as a unit.
//!
//! A `TransactionScope` owns exactly one database transaction. Repositories
//! and the unit of work share the scope by cloning its handle; the scope can
//! also be joined by a second service so both run inside one transaction.
//! When the last handle is dropped without a commit, the transaction is
//! rolled back and its connection goes back to the pool.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    AccessMode, DatabaseConnection, DatabaseTransaction, DbErr, IsolationLevel, TransactionTrait,
};
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Unit of Work trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Flush pending writes and, when `commit_transaction` is true, commit.
    ///
    /// Passing `false` leaves the transaction open for the caller that owns
    /// the outer scope.
    async fn commit(&self, commit_transaction: bool) -> AppResult<()>;

    /// Roll back the active transaction, if one is still open.
    async fn rollback(&self) -> AppResult<()>;
}

struct ScopeState {
    txn: Mutex<Option<DatabaseTransaction>>,
    cancel: CancellationToken,
}

impl Drop for ScopeState {
    fn drop(&mut self) {
        if self.txn.get_mut().is_some() {
            // DatabaseTransaction rolls itself back on drop
            tracing::debug!("Transaction scope released without commit, rolling back");
        }
    }
}

/// Shared handle to one open transaction.
#[derive(Clone)]
pub struct TransactionScope {
    state: Arc<ScopeState>,
}

impl TransactionScope {
    /// Begin a new read-committed transaction bound to `cancel`.
    pub async fn begin(db: &DatabaseConnection, cancel: CancellationToken) -> AppResult<Self> {
        if cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        let txn = db
            .begin_with_config(Some(IsolationLevel::ReadCommitted), Some(AccessMode::ReadWrite))
            .await
            .map_err(AppError::from)?;

        Ok(Self {
            state: Arc::new(ScopeState {
                txn: Mutex::new(Some(txn)),
                cancel,
            }),
        })
    }

    /// Whether the scope's cancellation token has fired.
    pub fn is_cancelled(&self) -> bool {
        self.state.cancel.is_cancelled()
    }

    /// Whether the transaction has not been committed or rolled back yet.
    pub async fn is_open(&self) -> bool {
        self.state.txn.lock().await.is_some()
    }

    /// Borrow the open transaction for the duration of one statement.
    pub async fn transaction(&self) -> AppResult<MappedMutexGuard<'_, DatabaseTransaction>> {
        let slot = self.state.txn.lock().await;
        MutexGuard::try_map(slot, |txn| txn.as_mut()).map_err(|_| released())
    }

    /// Run a store operation, abandoning it if the scope is cancelled.
    pub async fn run<T, F>(&self, op: F) -> AppResult<T>
    where
        F: Future<Output = Result<T, DbErr>>,
    {
        tokio::select! {
            biased;
            _ = self.state.cancel.cancelled() => Err(AppError::Cancelled),
            result = op => result.map_err(AppError::from),
        }
    }

    async fn commit(&self) -> AppResult<()> {
        let txn = self.state.txn.lock().await.take().ok_or_else(released)?;
        txn.commit()
            .await
            .map_err(|e| AppError::transaction(format!("commit failed: {}", e)))
    }

    async fn rollback(&self) -> AppResult<()> {
        let Some(txn) = self.state.txn.lock().await.take() else {
            return Ok(());
        };
        txn.rollback()
            .await
            .map_err(|e| AppError::transaction(format!("rollback failed: {}", e)))
    }
}

fn released() -> AppError {
    AppError::transaction("transaction scope already released")
}

/// Unit of work over a `TransactionScope`.
pub struct ScopedUnitOfWork {
    scope: TransactionScope,
}

impl ScopedUnitOfWork {
    /// Begin a fresh transaction on `db`.
    pub async fn begin(db: &DatabaseConnection, cancel: CancellationToken) -> AppResult<Self> {
        Ok(Self::join(TransactionScope::begin(db, cancel).await?))
    }

    /// Take part in a transaction that is already open.
    pub fn join(scope: TransactionScope) -> Self {
        Self { scope }
    }

    /// The scope this unit of work commits.
    pub fn scope(&self) -> &TransactionScope {
        &self.scope
    }
}

#[async_trait]
impl UnitOfWork for ScopedUnitOfWork {
    async fn commit(&self, commit_transaction: bool) -> AppResult<()> {
        if self.scope.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        // Statements run directly on the transaction, so there is nothing
        // buffered to flush before the commit itself.
        if !commit_transaction {
            if !self.scope.is_open().await {
                return Err(released());
            }
            tracing::debug!("Commit deferred to the owner of the outer transaction");
            return Ok(());
        }

        self.scope.commit().await
    }

    async fn rollback(&self) -> AppResult<()> {
        tracing::debug!("Rolling back transaction");
        self.scope.rollback().await
    }
}

/// Entry point for opening transaction scopes on the shared pool.
#[derive(Clone)]
pub struct Persistence {
    db: Arc<DatabaseConnection>,
}

impl Persistence {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Open a new transaction scope.
    pub async fn begin(&self, cancel: CancellationToken) -> AppResult<TransactionScope> {
        TransactionScope::begin(&self.db, cancel).await
    }
}
