//! Replay one logical write against several stores.
//!
//! Each sink gets its own transaction, committed before the next sink starts.
//! There is no cross-store atomicity: when a later sink fails, earlier sinks
//! keep their committed rows and the caller receives
//! [`AppError::PartialMirrorFailure`] naming both sides.

use async_trait::async_trait;
use sea_orm::DatabaseTransaction;
use serde::Serialize;
use utoipa::ToSchema;

use super::{DataStore, StoreKind, commit_or_rollback};
use crate::error::{AppError, AppResult};

/// A write that can be applied, unchanged, inside any store's transaction.
#[async_trait]
pub trait MirroredWrite: Send + Sync {
    /// Short label for logs.
    fn name(&self) -> &'static str;

    /// Apply the write and return the number of rows affected.
    async fn apply(&self, txn: &DatabaseTransaction) -> AppResult<u64>;
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SinkOutcome {
    pub store: StoreKind,
    pub rows: u64,
}

/// Per-sink results of a fully successful replay.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct MirrorReport {
    pub sinks: Vec<SinkOutcome>,
}

impl MirrorReport {
    /// Rows written to the first sink.
    #[must_use]
    pub fn primary_rows(&self) -> u64 {
        self.sinks.first().map_or(0, |s| s.rows)
    }
}

pub struct Mirror<'a> {
    store: &'a DataStore,
    sinks: &'a [StoreKind],
}

impl<'a> Mirror<'a> {
    #[must_use]
    pub fn new(store: &'a DataStore, sinks: &'a [StoreKind]) -> Self {
        Self { store, sinks }
    }

    /// Apply `write` to every sink in order.
    ///
    /// # Errors
    ///
    /// Returns the sink's own error if the first sink fails (nothing committed),
    /// or `PartialMirrorFailure` if a later sink fails.
    pub async fn replay(&self, write: &dyn MirroredWrite) -> AppResult<MirrorReport> {
        let mut report = MirrorReport::default();

        for &kind in self.sinks {
            let outcome = match self.store.begin(kind).await {
                Ok(txn) => {
                    let applied = write.apply(&txn).await;
                    commit_or_rollback(txn, applied).await
                }
                Err(e) => Err(e.into()),
            };

            match outcome {
                Ok(rows) => {
                    tracing::debug!(write = write.name(), store = %kind, rows, "Mirror sink committed");
                    report.sinks.push(SinkOutcome { store: kind, rows });
                }
                Err(err) if report.sinks.is_empty() => return Err(err),
                Err(err) => {
                    let committed: Vec<StoreKind> = report.sinks.iter().map(|s| s.store).collect();
                    tracing::error!(
                        write = write.name(),
                        ?committed,
                        failed = %kind,
                        error = %err,
                        "Mirror diverged; committed stores keep their rows"
                    );
                    return Err(AppError::PartialMirrorFailure {
                        committed,
                        failed: kind,
                        source: Box::new(err),
                    });
                }
            }
        }

        Ok(report)
    }
}
