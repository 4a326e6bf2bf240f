//! Database connection, migrations and health.
//!
//! The server connects with [`Database::connect`], which brings the schema up
//! to date before any request is served. The `migrate` command connects with
//! [`Database::connect_without_migrations`] and drives the migrator itself.

use std::collections::HashSet;
use std::sync::Arc;

use sea_orm::{
    ConnectionTrait, Database as SeaDatabase, DatabaseConnection, DbErr, EntityTrait, Statement,
};
use sea_orm_migration::{seaql_migrations, MigratorTrait};

use crate::config::Config;

pub mod migrations;

pub use migrations::Migrator;

/// Pooled connection to the accounts database
///
/// Shared behind an `Arc`; mock connections are not `Clone`.
#[derive(Clone)]
pub struct Database {
    connection: Arc<DatabaseConnection>,
}

impl From<Arc<DatabaseConnection>> for Database {
    fn from(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }
}

impl Database {
    /// Connect and apply every pending migration.
    pub async fn connect(config: &Config) -> Result<Self, DbErr> {
        let database = Self::connect_without_migrations(config).await?;

        database.run_migrations().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to apply migrations");
            e
        })?;

        tracing::info!("Accounts schema is up to date");
        Ok(database)
    }

    /// Connect without touching the schema.
    pub async fn connect_without_migrations(config: &Config) -> Result<Self, DbErr> {
        let connection = SeaDatabase::connect(&config.database_url).await?;
        Ok(Arc::new(connection).into())
    }

    /// Pool handle for opening transaction scopes.
    pub fn get_connection(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.connection)
    }

    pub async fn run_migrations(&self) -> Result<(), DbErr> {
        Migrator::up(&*self.connection, None).await
    }

    /// Revert the most recent migration only.
    pub async fn rollback_migration(&self) -> Result<(), DbErr> {
        Migrator::down(&*self.connection, Some(1)).await
    }

    /// Every known migration paired with whether it has been applied, in
    /// application order.
    pub async fn migration_status(&self) -> Result<Vec<(String, bool)>, DbErr> {
        let applied: HashSet<String> = seaql_migrations::Entity::find()
            .all(&*self.connection)
            .await?
            .into_iter()
            .map(|row| row.version)
            .collect();

        Ok(Migrator::migrations()
            .iter()
            .map(|migration| {
                let name = migration.name().to_string();
                let done = applied.contains(&name);
                (name, done)
            })
            .collect())
    }

    /// Drop all tables, then re-apply every migration, seed included.
    pub async fn fresh_migrations(&self) -> Result<(), DbErr> {
        Migrator::fresh(&*self.connection).await
    }

    /// Round-trip a trivial query.
    pub async fn ping(&self) -> Result<(), DbErr> {
        let backend = self.connection.get_database_backend();
        self.connection
            .execute(Statement::from_string(backend, "SELECT 1"))
            .await
            .map(|_| ())
    }
}
