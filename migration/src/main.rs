//! Standalone schema runner for one store.
//!
//! `DATABASE_URL=sqlite://data/predictions.db?mode=rwc cargo run -p migration -- up`

use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    cli::run_cli(migration::Migrator).await;
}
