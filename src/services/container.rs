//! Service Container - Per-request service construction.
//!
//! SOLID (SRP): Manages service lifecycle and access.
//! SOLID (DIP): Depends on service traits, not implementations.
//!
//! Account services are never shared between calls: each call opens its own
//! transaction scope and gets a repository and unit of work bound to it.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::{AccountManager, AccountService, JwtIssuer, TokenIssuer};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{AccountStore, Database, Persistence, ScopedUnitOfWork, TransactionScope};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ServiceContainer: Send + Sync {
    /// Open a transaction scope and build an account service on it
    async fn accounts(&self, cancel: CancellationToken) -> AppResult<Arc<dyn AccountService>>;

    /// Get the token issuer
    fn tokens(&self) -> Arc<dyn TokenIssuer>;

    /// Check that the backing store is reachable
    async fn ping(&self) -> AppResult<()>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    database: Arc<Database>,
    persistence: Persistence,
    tokens: Arc<dyn TokenIssuer>,
}

impl Services {
    /// Create a new service container with all services initialized
    pub fn new(database: Arc<Database>, tokens: Arc<dyn TokenIssuer>) -> Self {
        let persistence = Persistence::new(database.get_connection());
        Self {
            database,
            persistence,
            tokens,
        }
    }

    /// Create service container from database and config
    pub fn from_config(database: Arc<Database>, config: &Config) -> Self {
        let tokens = Arc::new(JwtIssuer::new(config.token_settings()));
        Self::new(database, tokens)
    }

    /// Open a transaction scope that several services can share.
    pub async fn begin(&self, cancel: CancellationToken) -> AppResult<TransactionScope> {
        self.persistence.begin(cancel).await
    }

    /// Account service that commits its own scope.
    pub fn accounts_on(&self, scope: TransactionScope) -> AccountManager {
        AccountManager::new(
            Arc::new(AccountStore::new(scope.clone())),
            Arc::new(ScopedUnitOfWork::join(scope)),
            self.tokens.clone(),
        )
    }

    /// Account service taking part in a scope owned by the caller.
    ///
    /// Its writes are flushed but the caller commits.
    pub fn accounts_within(&self, scope: &TransactionScope) -> AccountManager {
        self.accounts_on(scope.clone()).within_outer_transaction()
    }
}

#[async_trait]
impl ServiceContainer for Services {
    async fn accounts(&self, cancel: CancellationToken) -> AppResult<Arc<dyn AccountService>> {
        let scope = self.begin(cancel).await?;
        Ok(Arc::new(self.accounts_on(scope)))
    }

    fn tokens(&self) -> Arc<dyn TokenIssuer> {
        self.tokens.clone()
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(self.database.ping().await?)
    }
}
