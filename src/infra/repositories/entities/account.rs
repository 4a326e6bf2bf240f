//! Account database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, NotSet, Set};

use crate::domain::{Account, AccountRole};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub full_name: String,
    pub login: String,
    pub password: String,
    pub email: String,
    pub role: i32,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
///
/// A role code outside the known set is a corrupt row, not a plain user.
impl TryFrom<Model> for Account {
    type Error = DbErr;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let role = AccountRole::try_from(model.role).map_err(|e| {
            tracing::warn!(
                account_id = model.id,
                role = model.role,
                "Unknown role code in users table"
            );
            DbErr::Type(e)
        })?;

        Ok(Account {
            id: model.id,
            full_name: model.full_name,
            login: model.login,
            password: model.password,
            email: model.email,
            role,
            is_active: model.is_active,
            created_at: model.created_at,
        })
    }
}

impl ActiveModel {
    /// Active model for an insert; the store assigns the identifier.
    pub fn for_insert(account: &Account) -> Self {
        Self {
            id: NotSet,
            ..Self::for_update(account)
        }
    }

    /// Active model replacing every column of an existing row.
    pub fn for_update(account: &Account) -> Self {
        Self {
            id: ActiveValue::Unchanged(account.id),
            full_name: Set(account.full_name.clone()),
            login: Set(account.login.clone()),
            password: Set(account.password.clone()),
            email: Set(account.email.clone()),
            role: Set(account.role.code()),
            is_active: Set(account.is_active),
            created_at: Set(account.created_at),
        }
    }
}
