//! Account service - Account lifecycle and authentication use cases.
//!
//! SOLID (SRP): Orchestrates account use cases only; hashing lives in the
//! domain `Password` value object and signing in `TokenIssuer`.
//! DDD: Every mutation goes existence check, fetch, mutate, commit, in that
//! order, inside the unit of work of the calling scope.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use super::TokenIssuer;
use crate::config::{ACCOUNT_NOT_FOUND, ACCOUNT_NOT_FOUND_FOR_STATUS};
use crate::domain::{
    Account, AccountFilter, AccountResponse, CreateAccountRequest, LoginRequest, Password,
    TokenResponse, UpdateAccountRequest,
};
use crate::errors::{AppError, AppResult};
use crate::infra::{AccountRepository, UnitOfWork};

/// Account service trait for dependency injection.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Create an account, hashing its password and stamping its creation time
    async fn create(&self, request: CreateAccountRequest) -> AppResult<AccountResponse>;

    /// Replace an existing account, keeping its creation time
    async fn update(&self, request: UpdateAccountRequest) -> AppResult<()>;

    /// Permanently remove an account
    async fn delete(&self, id: i32) -> AppResult<()>;

    /// Get account by ID, `None` when absent
    async fn get_by_id(&self, id: i32) -> AppResult<Option<AccountResponse>>;

    /// Get account by email (case-insensitive), `None` when absent
    async fn get_by_email(&self, email: String) -> AppResult<Option<AccountResponse>>;

    /// List active accounts
    async fn get_all(&self) -> AppResult<Vec<AccountResponse>>;

    /// Allow an account to log in
    async fn activate(&self, id: i32) -> AppResult<()>;

    /// Block an account from logging in
    async fn deactivate(&self, id: i32) -> AppResult<()>;

    /// Check credentials and issue a bearer token
    async fn login(&self, request: LoginRequest) -> AppResult<TokenResponse>;
}

/// Concrete implementation of AccountService.
pub struct AccountManager {
    accounts: Arc<dyn AccountRepository>,
    uow: Arc<dyn UnitOfWork>,
    tokens: Arc<dyn TokenIssuer>,
    commit_transaction: bool,
}

impl AccountManager {
    /// Create a service that commits its own transaction
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        uow: Arc<dyn UnitOfWork>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            accounts,
            uow,
            tokens,
            commit_transaction: true,
        }
    }

    /// Leave the final commit to whoever owns the enclosing transaction
    pub fn within_outer_transaction(mut self) -> Self {
        self.commit_transaction = false;
        self
    }

    /// Existence check first, then fetch; both report `message` when absent.
    async fn require(&self, id: i32, message: &str) -> AppResult<Account> {
        if !self.accounts.exists_by(AccountFilter::Id(id)).await? {
            return Err(AppError::not_found(message));
        }

        self.accounts
            .get_one_by(AccountFilter::Id(id))
            .await?
            .ok_or_else(|| AppError::not_found(message))
    }

    /// Commit after a successful write. A failed write rolls back and
    /// surfaces its own error.
    async fn finish<T: Send>(&self, written: AppResult<T>) -> AppResult<T> {
        match written {
            Ok(value) => {
                self.uow.commit(self.commit_transaction).await?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = self.uow.rollback().await {
                    tracing::warn!(error = %rollback, "Rollback after failed write also failed");
                }
                Err(e)
            }
        }
    }

    async fn set_active(&self, id: i32, active: bool) -> AppResult<()> {
        let mut account = self.require(id, ACCOUNT_NOT_FOUND_FOR_STATUS).await?;
        if active {
            account.activate();
        } else {
            account.deactivate();
        }

        let written = self.accounts.update(account).await;
        self.finish(written).await.map(|_| ())
    }
}

#[async_trait]
impl AccountService for AccountManager {
    async fn create(&self, request: CreateAccountRequest) -> AppResult<AccountResponse> {
        let account = request.into_account(Utc::now());
        let written = self.accounts.insert(account).await;
        let stored = self.finish(written).await?;

        tracing::info!(account_id = stored.id, "Account created");
        Ok(AccountResponse::from(stored))
    }

    async fn update(&self, request: UpdateAccountRequest) -> AppResult<()> {
        let current = self.require(request.id, ACCOUNT_NOT_FOUND).await?;

        // Password is stored as sent; only create hashes.
        let replacement = request.into_account(current.created_at);
        let written = self.accounts.update(replacement).await;
        self.finish(written).await.map(|_| ())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let account = self.require(id, ACCOUNT_NOT_FOUND).await?;

        let written = self.accounts.delete(account).await;
        self.finish(written).await
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Option<AccountResponse>> {
        Ok(self
            .accounts
            .get_one_by(AccountFilter::Id(id))
            .await?
            .map(AccountResponse::from))
    }

    async fn get_by_email(&self, email: String) -> AppResult<Option<AccountResponse>> {
        Ok(self
            .accounts
            .get_one_by(AccountFilter::EmailIgnoreCase(email))
            .await?
            .map(AccountResponse::from))
    }

    async fn get_all(&self) -> AppResult<Vec<AccountResponse>> {
        let active = AccountFilter::Active;
        let accounts = self.accounts.get_all_by(Some(active.clone())).await?;

        Ok(accounts
            .into_iter()
            .filter(|account| active.matches(account))
            .map(AccountResponse::from)
            .collect())
    }

    async fn activate(&self, id: i32) -> AppResult<()> {
        self.set_active(id, true).await
    }

    async fn deactivate(&self, id: i32) -> AppResult<()> {
        self.set_active(id, false).await
    }

    async fn login(&self, request: LoginRequest) -> AppResult<TokenResponse> {
        let password_hash = Password::hash(&request.password).into_string();
        let account = self
            .accounts
            .login(request.email.clone(), password_hash)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !account.is_active {
            return Err(AppError::AccountBlocked);
        }

        let token = self
            .tokens
            .issue(&request.email, account.role.display_name())?;

        Ok(TokenResponse::issued(token))
    }
}
