//! Account repository implementation.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
};

use super::base::{Persisted, Repository};
use super::entities::account::{self, ActiveModel, Entity as AccountEntity};
use crate::domain::{Account, AccountFilter};
use crate::errors::AppResult;
use crate::infra::unit_of_work::TransactionScope;

impl Persisted for Account {
    type Id = i32;
    type Filter = AccountFilter;

    fn id(&self) -> i32 {
        self.id
    }
}

/// Account repository trait for dependency injection.
///
/// Extends the generic capability set with the credential lookup used by login.
#[async_trait]
pub trait AccountRepository: Repository<Account> {
    /// Find the account whose email and stored password hash both match exactly
    async fn login(&self, email: String, password_hash: String) -> AppResult<Option<Account>>;
}

/// Translate a domain filter into a SeaORM condition.
fn condition(filter: &AccountFilter) -> Condition {
    match filter {
        AccountFilter::Id(id) => Condition::all().add(account::Column::Id.eq(*id)),
        AccountFilter::EmailIgnoreCase(email) => Condition::all().add(
            Expr::expr(Func::lower(Expr::col(account::Column::Email))).eq(email.to_lowercase()),
        ),
        AccountFilter::Active => Condition::all().add(account::Column::IsActive.eq(true)),
    }
}

/// Concrete implementation of AccountRepository bound to one transaction scope
pub struct AccountStore {
    scope: TransactionScope,
}

impl AccountStore {
    /// Create new repository instance
    pub fn new(scope: TransactionScope) -> Self {
        Self { scope }
    }
}

#[async_trait]
impl Repository<Account> for AccountStore {
    async fn exists_by(&self, filter: AccountFilter) -> AppResult<bool> {
        Ok(self.count_by(Some(filter)).await? > 0)
    }

    async fn get_one_by(&self, filter: AccountFilter) -> AppResult<Option<Account>> {
        let txn = self.scope.transaction().await?;
        let model = self
            .scope
            .run(AccountEntity::find().filter(condition(&filter)).one(&*txn))
            .await?;

        Ok(model.map(Account::try_from).transpose()?)
    }

    async fn get_all_by(&self, filter: Option<AccountFilter>) -> AppResult<Vec<Account>> {
        let mut query = AccountEntity::find();
        if let Some(filter) = &filter {
            query = query.filter(condition(filter));
        }

        let txn = self.scope.transaction().await?;
        let models = self.scope.run(query.all(&*txn)).await?;

        Ok(models
            .into_iter()
            .map(Account::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn count_by(&self, filter: Option<AccountFilter>) -> AppResult<u64> {
        let mut query = AccountEntity::find();
        if let Some(filter) = &filter {
            query = query.filter(condition(filter));
        }

        let txn = self.scope.transaction().await?;
        self.scope.run(query.count(&*txn)).await
    }

    async fn insert(&self, entity: Account) -> AppResult<Account> {
        let txn = self.scope.transaction().await?;
        let model = self
            .scope
            .run(ActiveModel::for_insert(&entity).insert(&*txn))
            .await?;

        Ok(Account::try_from(model)?)
    }

    async fn update(&self, entity: Account) -> AppResult<Account> {
        let txn = self.scope.transaction().await?;
        let model = self
            .scope
            .run(ActiveModel::for_update(&entity).update(&*txn))
            .await?;

        Ok(Account::try_from(model)?)
    }

    async fn delete(&self, entity: Account) -> AppResult<()> {
        let txn = self.scope.transaction().await?;
        self.scope
            .run(AccountEntity::delete_by_id(entity.id).exec(&*txn))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl AccountRepository for AccountStore {
    async fn login(&self, email: String, password_hash: String) -> AppResult<Option<Account>> {
        let txn = self.scope.transaction().await?;
        let model = self
            .scope
            .run(
                AccountEntity::find()
                    .filter(account::Column::Email.eq(email))
                    .filter(account::Column::Password.eq(password_hash))
                    .one(&*txn),
            )
            .await?;

        Ok(model.map(Account::try_from).transpose()?)
    }
}

#[cfg(any(test, feature = "test-utils"))]
mockall::mock! {
    pub Accounts {}

    #[async_trait]
    impl Repository<Account> for Accounts {
        async fn exists_by(&self, filter: AccountFilter) -> AppResult<bool>;
        async fn get_one_by(&self, filter: AccountFilter) -> AppResult<Option<Account>>;
        async fn get_all_by(&self, filter: Option<AccountFilter>) -> AppResult<Vec<Account>>;
        async fn count_by(&self, filter: Option<AccountFilter>) -> AppResult<u64>;
        async fn insert(&self, entity: Account) -> AppResult<Account>;
        async fn update(&self, entity: Account) -> AppResult<Account>;
        async fn delete(&self, entity: Account) -> AppResult<()>;
    }

    #[async_trait]
    impl AccountRepository for Accounts {
        async fn login(&self, email: String, password_hash: String) -> AppResult<Option<Account>>;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{TimeZone, Utc};
    use sea_orm::{
        DatabaseBackend, DatabaseConnection, DbErr, MockDatabase, MockExecResult, Value,
    };
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::domain::{AccountRole, Password};
    use crate::errors::AppError;
    use crate::infra::unit_of_work::{ScopedUnitOfWork, UnitOfWork};

    fn admin_model() -> account::Model {
        account::Model {
            id: 1,
            full_name: "Administrator".to_string(),
            login: "administrator".to_string(),
            password: Password::hash("123456").into_string(),
            email: "adm@adm.com".to_string(),
            role: 1,
            is_active: true,
            created_at: Utc.with_ymd_and_hms(2025, 5, 30, 12, 50, 51).unwrap(),
        }
    }

    async fn store(db: &DatabaseConnection) -> AccountStore {
        AccountStore::new(
            TransactionScope::begin(db, CancellationToken::new())
                .await
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_get_one_by_maps_model() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![admin_model()]])
            .into_connection();

        let account = store(&db)
            .await
            .get_one_by(AccountFilter::Id(1))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(account.id, 1);
        assert_eq!(account.role, AccountRole::Admin);
        assert!(account.is_active);
    }

    #[tokio::test]
    async fn test_get_one_by_returns_none_when_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<account::Model>::new()])
            .into_connection();

        let result = store(&db)
            .await
            .get_one_by(AccountFilter::EmailIgnoreCase("nobody@adm.com".to_string()))
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_unknown_role_code_is_a_database_error() {
        let mut corrupt = admin_model();
        corrupt.role = 7;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![corrupt]])
            .into_connection();

        let result = store(&db).await.get_one_by(AccountFilter::Id(1)).await;

        assert!(matches!(result, Err(AppError::Database(DbErr::Type(_)))));
    }

    #[tokio::test]
    async fn test_exists_by_counts_matches() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![BTreeMap::from([(
                "num_items",
                Value::BigInt(Some(1)),
            )])]])
            .append_query_results([vec![BTreeMap::from([(
                "num_items",
                Value::BigInt(Some(0)),
            )])]])
            .into_connection();
        let store = store(&db).await;

        assert!(store.exists_by(AccountFilter::Id(1)).await.unwrap());
        assert!(!store.exists_by(AccountFilter::Id(2)).await.unwrap());
    }

    #[tokio::test]
    async fn test_login_matches_email_and_hash() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![admin_model()]])
            .into_connection();

        let account = store(&db)
            .await
            .login(
                "adm@adm.com".to_string(),
                Password::hash("123456").into_string(),
            )
            .await
            .unwrap();

        assert_eq!(account.map(|a| a.email), Some("adm@adm.com".to_string()));
    }

    #[tokio::test]
    async fn test_insert_returns_assigned_id() {
        let mut inserted = admin_model();
        inserted.id = 7;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![inserted]])
            .into_connection();

        let mut account = Account::try_from(admin_model()).unwrap();
        account.id = 0;
        let stored = store(&db).await.insert(account).await.unwrap();

        assert_eq!(stored.id, 7);
    }

    #[tokio::test]
    async fn test_delete_executes_statement() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        store(&db)
            .await
            .delete(Account::try_from(admin_model()).unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_released_scope_rejects_queries() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let scope = TransactionScope::begin(&db, CancellationToken::new())
            .await
            .unwrap();
        let store = AccountStore::new(scope.clone());

        ScopedUnitOfWork::join(scope).commit(true).await.unwrap();

        let result = store.get_one_by(AccountFilter::Id(1)).await;
        assert!(matches!(result, Err(AppError::Transaction(_))));
    }

    #[tokio::test]
    async fn test_cancelled_scope_rejects_queries() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![admin_model()]])
            .into_connection();
        let cancel = CancellationToken::new();
        let store = AccountStore::new(
            TransactionScope::begin(&db, cancel.clone())
                .await
                .unwrap(),
        );

        cancel.cancel();

        let result = store.get_one_by(AccountFilter::Id(1)).await;
        assert!(matches!(result, Err(AppError::Cancelled)));
    }
}
