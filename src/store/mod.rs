//! The three SQLite stores and the write primitives shared by every sync path.

pub mod mirror;
pub mod tables;
pub mod upsert;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction, DbErr,
    TransactionTrait,
};
use sea_orm_migration::MigratorTrait;
use serde::Serialize;

use crate::config::Config;
use crate::error::AppResult;

pub use mirror::{Mirror, MirrorReport, MirroredWrite};
pub use upsert::{Assign, UpsertSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Raw CSV uploads.
    Unprocessed,
    /// Rows cleaned by the ETL process.
    Processed,
    /// Dimensions, facts and analytic outputs.
    Predictions,
}

impl StoreKind {
    pub const ALL: [Self; 3] = [Self::Unprocessed, Self::Processed, Self::Predictions];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unprocessed => "unprocessed",
            Self::Processed => "processed",
            Self::Predictions => "predictions",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unprocessed" => Ok(Self::Unprocessed),
            "processed" => Ok(Self::Processed),
            "predictions" | "predictions_data" => Ok(Self::Predictions),
            other => Err(format!("unknown store '{other}'")),
        }
    }
}

/// Handles to the three stores.
///
/// Each store is a single SQLite connection, so every statement issued while a
/// transaction is open on that store must go through the transaction.
#[derive(Clone)]
pub struct DataStore {
    unprocessed: DatabaseConnection,
    processed: DatabaseConnection,
    predictions: DatabaseConnection,
}

impl DataStore {
    /// Connect to the three stores named in `config`.
    ///
    /// # Errors
    ///
    /// Returns the first connection error.
    pub async fn connect(config: &Config) -> Result<Self, DbErr> {
        Ok(Self {
            unprocessed: open(config.database_url(StoreKind::Unprocessed)).await?,
            processed: open(config.database_url(StoreKind::Processed)).await?,
            predictions: open(config.database_url(StoreKind::Predictions)).await?,
        })
    }

    /// Three independent in-memory stores with the schema applied.
    ///
    /// # Errors
    ///
    /// Returns an error if a connection or migration fails.
    pub async fn in_memory() -> Result<Self, DbErr> {
        let store = Self {
            unprocessed: open("sqlite::memory:").await?,
            processed: open("sqlite::memory:").await?,
            predictions: open("sqlite::memory:").await?,
        };
        store.migrate().await?;
        Ok(store)
    }

    /// Apply the full schema to every store.
    ///
    /// # Errors
    ///
    /// Returns the first migration error.
    pub async fn migrate(&self) -> Result<(), DbErr> {
        for kind in StoreKind::ALL {
            migration::Migrator::up(self.conn(kind), None).await?;
            tracing::debug!(store = %kind, "Schema up to date");
        }
        Ok(())
    }

    #[must_use]
    pub fn conn(&self, kind: StoreKind) -> &DatabaseConnection {
        match kind {
            StoreKind::Unprocessed => &self.unprocessed,
            StoreKind::Processed => &self.processed,
            StoreKind::Predictions => &self.predictions,
        }
    }

    /// Open a transaction on one store.
    ///
    /// # Errors
    ///
    /// Returns an error if `BEGIN` fails.
    pub async fn begin(&self, kind: StoreKind) -> Result<DatabaseTransaction, DbErr> {
        self.conn(kind).begin().await
    }

    /// Ping each store; used by the health endpoint.
    pub async fn ping_all(&self) -> Vec<(StoreKind, Result<(), DbErr>)> {
        let mut results = Vec::with_capacity(StoreKind::ALL.len());
        for kind in StoreKind::ALL {
            results.push((kind, self.conn(kind).ping().await));
        }
        results
    }
}

async fn open(url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(url.to_owned());
    options
        .max_connections(1)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    let conn = Database::connect(options).await?;
    conn.execute_unprepared("PRAGMA foreign_keys = ON").await?;
    Ok(conn)
}

/// Commit when `outcome` is `Ok`, otherwise roll back and return the original error.
///
/// A failing `ROLLBACK` is logged and swallowed.
///
/// # Errors
///
/// Returns the error carried by `outcome`, or the commit error.
pub async fn commit_or_rollback<T>(txn: DatabaseTransaction, outcome: AppResult<T>) -> AppResult<T> {
    match outcome {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(err) => {
            match txn.rollback().await {
                Ok(()) => tracing::error!(error = %err, "Transaction rolled back"),
                Err(rollback_err) => {
                    tracing::warn!(error = %err, rollback_error = %rollback_err, "Rollback failed");
                }
            }
            Err(err)
        }
    }
}
