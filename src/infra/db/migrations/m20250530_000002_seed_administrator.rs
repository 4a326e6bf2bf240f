//! Migration: Seed the built-in administrator account.

use chrono::{TimeZone, Utc};
use sea_orm_migration::prelude::*;

use super::m20250530_000001_create_users_table::Users;
use crate::config::ROLE_ADMIN_CODE;
use crate::domain::Password;

const ADMIN_EMAIL: &str = "adm@adm.com";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let created_at = Utc
            .with_ymd_and_hms(2025, 5, 30, 12, 50, 51)
            .single()
            .ok_or_else(|| DbErr::Migration("invalid seed timestamp".to_string()))?;

        let insert = Query::insert()
            .into_table(Users::Table)
            .columns([
                Users::FullName,
                Users::Login,
                Users::Password,
                Users::Email,
                Users::Role,
                Users::IsActive,
                Users::CreatedAt,
            ])
            .values([
                "Administrator".into(),
                "administrator".into(),
                Password::hash("123456").into_string().into(),
                ADMIN_EMAIL.into(),
                ROLE_ADMIN_CODE.into(),
                true.into(),
                created_at.into(),
            ])
            .map_err(|e| DbErr::Migration(e.to_string()))?
            .to_owned();

        manager.exec_stmt(insert).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = Query::delete()
            .from_table(Users::Table)
            .and_where(Expr::col(Users::Email).eq(ADMIN_EMAIL))
            .to_owned();

        manager.exec_stmt(delete).await
    }
}
