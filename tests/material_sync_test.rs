//! Integration tests for material fan-out and transactional rollback.
//!
//! Run with: cargo test --test material_sync_test

mod support;

use axum::http::StatusCode;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::{Value, json};

use support::TestApp;
use turbine_sync::entity::{material, serial_number_profile};
use turbine_sync::store::StoreKind;

fn staged_materials() -> Value {
    json!([
        {
            "Material": "A9B-1001",
            "Plant": "15S1",
            "Description": "Main bearing",
            "MaterialCategory": "Gearbox",
            "BatchManagementPlant": "X",
            "ReplacementPart": "B",
            "Serial_No_Profile": "SN01"
        },
        {
            "Material": "A9B-1001",
            "Plant": "20a1",
            "Description": "Main bearing",
            "ViolationReplacementPart": "1"
        },
        {
            "Material": "A9B-1001",
            "Plant": "99Z9",
            "ReplacementPart": "B"
        },
        {
            "Material": "A9B-2002",
            "Plant": "15S1",
            "Description": "Pitch motor",
            "ReplacementPart": "N"
        }
    ])
}

async fn seeded() -> TestApp {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_json("/uploadMaterialPredictionsData", staged_materials())
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (status, _) = app
        .post_json(
            "/syncPlantCoordinates",
            json!({ "plants": [{ "code": "15S1", "isPlant": true }, { "code": "20A1", "isPlant": true }] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    app
}

#[tokio::test]
async fn absent_material_is_skipped_with_success() {
    let app = seeded().await;

    let (status, body) = app
        .post_json("/syncMaterialData", json!({ "materials": ["A9B-MISSING"] }))
        .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["skipped"], json!(["A9B-MISSING"]));
    assert_eq!(app.count(StoreKind::Predictions, "Material").await, 0);
    assert_eq!(app.count(StoreKind::Predictions, "ReplacementPart").await, 0);
}

#[tokio::test]
async fn material_fans_out_to_parts_and_serial_profiles() {
    let app = seeded().await;

    let (status, body) = app
        .post_json("/syncMaterialData", json!({ "materials": ["A9B-1001", "A9B-2002"] }))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    assert_eq!(app.count(StoreKind::Predictions, "Material").await, 2);
    // 15S1 via marker B, 20A1 via violation matched case-insensitively; 99Z9 is unknown
    assert_eq!(app.count(StoreKind::Predictions, "ReplacementPart").await, 2);
    assert_eq!(app.count(StoreKind::Predictions, "SerialNumberProfile").await, 1);

    let conn = app.store().conn(StoreKind::Predictions);
    let bearing = material::Entity::find()
        .filter(material::Column::MaterialA9bNumber.eq("A9B-1001"))
        .one(conn)
        .await
        .expect("query")
        .expect("material row");
    assert_eq!(bearing.material_category.as_deref(), Some("Gearbox"));
    assert_eq!(bearing.material_description.as_deref(), Some("Main bearing"));
    assert!(bearing.is_batch_managed);

    let profile = serial_number_profile::Entity::find()
        .filter(serial_number_profile::Column::MaterialId.eq(bearing.material_id))
        .one(conn)
        .await
        .expect("query")
        .expect("profile row");
    assert_eq!(profile.tracking_number, "SN01");

    let reasons = app
        .scalar(
            StoreKind::Predictions,
            "SELECT COUNT(*) AS n FROM ReplacementPart WHERE Reason = 'Violation'",
        )
        .await;
    assert_eq!(reasons, 1);
}

#[tokio::test]
async fn resync_keeps_surrogate_ids_and_row_counts() {
    let app = seeded().await;
    let payload = json!({ "materials": ["A9B-1001"] });

    app.post_json("/syncMaterialData", payload.clone()).await;
    let first_id = app
        .scalar(
            StoreKind::Predictions,
            "SELECT Material_ID AS n FROM Material WHERE Material_A9B_Number = 'A9B-1001'",
        )
        .await;

    let (status, _) = app.post_json("/syncMaterialData", payload).await;
    assert_eq!(status, StatusCode::OK);

    let second_id = app
        .scalar(
            StoreKind::Predictions,
            "SELECT Material_ID AS n FROM Material WHERE Material_A9B_Number = 'A9B-1001'",
        )
        .await;
    assert_eq!(first_id, second_id);
    assert_eq!(app.count(StoreKind::Predictions, "Material").await, 1);
    assert_eq!(app.count(StoreKind::Predictions, "ReplacementPart").await, 2);
    assert_eq!(app.count(StoreKind::Predictions, "SerialNumberProfile").await, 1);
}

#[tokio::test]
async fn failure_mid_batch_rolls_back_everything() {
    let app = seeded().await;
    app.fail_inserts(StoreKind::Predictions, "ReplacementPart").await;

    let (status, body) = app
        .post_json("/syncMaterialData", json!({ "materials": ["A9B-2002", "A9B-1001"] }))
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(
        body["error"].as_str().unwrap_or_default().contains("simulated insert failure"),
        "{body}"
    );
    // A9B-2002 was upserted before the failing insert and must be gone too
    assert_eq!(app.count(StoreKind::Predictions, "Material").await, 0);
    assert_eq!(app.count(StoreKind::Predictions, "ReplacementPart").await, 0);
    assert_eq!(app.count(StoreKind::Predictions, "SerialNumberProfile").await, 0);
}

#[tokio::test]
async fn non_array_materials_is_rejected() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_json("/syncMaterialData", json!({ "materials": "A9B-1001" }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}
