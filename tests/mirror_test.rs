//! Integration tests for mirrored material uploads.
//!
//! Run with: cargo test --test mirror_test

mod support;

use async_trait::async_trait;
use axum::http::StatusCode;
use sea_orm::{ConnectionTrait, DatabaseTransaction};
use serde_json::{Value, json};

use support::TestApp;
use turbine_sync::error::{AppError, AppResult};
use turbine_sync::store::{Mirror, MirroredWrite, StoreKind};

fn records() -> Value {
    json!([
        { "Material": "A9B-1001", "Plant": "15S1", "MaterialCategory": "Gearbox" },
        { "Material": "A9B-2002", "Plant": "15S1" },
        { "Plant": "15S1", "Description": "no material number" }
    ])
}

#[tokio::test]
async fn upload_lands_in_every_mirror() {
    let app = TestApp::new().await;

    let (status, body) = app.post_json("/uploadProcessedMaterialData", records()).await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["sinks"][0]["store"], "processed");
    assert_eq!(body["data"]["sinks"][0]["rows"], 2);
    assert_eq!(body["data"]["sinks"][1]["store"], "predictions");
    assert_eq!(app.count(StoreKind::Processed, "MaterialData").await, 2);
    assert_eq!(app.count(StoreKind::Predictions, "MaterialData").await, 2);
    assert_eq!(app.count(StoreKind::Unprocessed, "MaterialData").await, 0);
}

#[tokio::test]
async fn later_sink_failure_is_reported_and_earlier_sink_keeps_rows() {
    let app = TestApp::new().await;
    app.fail_inserts(StoreKind::Predictions, "MaterialData").await;

    let (status, body) = app.post_json("/uploadProcessedMaterialData", records()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    let message = body["message"].as_str().unwrap_or_default();
    assert!(message.contains("Processed"), "{message}");
    assert!(message.contains("predictions"), "{message}");
    assert!(
        body["error"].as_str().unwrap_or_default().contains("simulated insert failure"),
        "{body}"
    );
    assert_eq!(app.count(StoreKind::Processed, "MaterialData").await, 2);
    assert_eq!(app.count(StoreKind::Predictions, "MaterialData").await, 0);
}

#[tokio::test]
async fn first_sink_failure_commits_nothing() {
    let app = TestApp::new().await;
    app.fail_inserts(StoreKind::Processed, "MaterialData").await;

    let (status, body) = app.post_json("/uploadProcessedMaterialData", records()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Database operation failed");
    assert_eq!(app.count(StoreKind::Processed, "MaterialData").await, 0);
    assert_eq!(app.count(StoreKind::Predictions, "MaterialData").await, 0);
}

#[tokio::test]
async fn empty_upload_is_rejected_before_any_store() {
    let app = TestApp::new().await;

    let (status, _) = app.post_json("/uploadProcessedMaterialData", json!([])).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Inserts one Technician row and fails on the configured store.
struct FlakyWrite {
    fail_on: StoreKind,
    current: std::sync::Mutex<usize>,
    order: Vec<StoreKind>,
}

#[async_trait]
impl MirroredWrite for FlakyWrite {
    fn name(&self) -> &'static str {
        "flaky"
    }

    async fn apply(&self, txn: &DatabaseTransaction) -> AppResult<u64> {
        let index = {
            let mut current = self.current.lock().expect("lock");
            let index = *current;
            *current += 1;
            index
        };
        txn.execute_unprepared("INSERT INTO \"Technician\" (\"Name\") VALUES ('Mirror')")
            .await?;
        if self.order[index] == self.fail_on {
            return Err(AppError::Internal("flaky sink".to_string()));
        }
        Ok(1)
    }
}

#[tokio::test]
async fn replay_names_committed_and_failed_sinks() {
    let app = TestApp::new().await;
    let sinks = [StoreKind::Unprocessed, StoreKind::Processed, StoreKind::Predictions];
    let write = FlakyWrite {
        fail_on: StoreKind::Predictions,
        current: std::sync::Mutex::new(0),
        order: sinks.to_vec(),
    };

    let err = Mirror::new(app.store(), &sinks)
        .replay(&write)
        .await
        .expect_err("third sink fails");

    match err {
        AppError::PartialMirrorFailure { committed, failed, .. } => {
            assert_eq!(committed, vec![StoreKind::Unprocessed, StoreKind::Processed]);
            assert_eq!(failed, StoreKind::Predictions);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(app.count(StoreKind::Unprocessed, "Technician").await, 1);
    assert_eq!(app.count(StoreKind::Processed, "Technician").await, 1);
    // the failing sink's own insert was rolled back
    assert_eq!(app.count(StoreKind::Predictions, "Technician").await, 0);
}
