//! Synchronisation of staged rows into dimensions, facts and analytic tables.
//!
//! Every public entry point opens its own transaction(s) and either commits
//! the whole batch or rolls it back.

pub mod dimensions;
pub mod facts;
pub mod health;
pub mod predictions;
pub mod staging;
pub mod transitions;

use serde::Serialize;
use utoipa::ToSchema;

/// Row counts for a batch import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ImportSummary {
    pub imported: u64,
    pub skipped: u64,
}
