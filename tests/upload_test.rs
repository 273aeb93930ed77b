//! Integration tests for staging uploads and the read endpoints.
//!
//! Run with: cargo test --test upload_test

mod support;

use axum::http::StatusCode;
use serde_json::json;

use support::TestApp;
use turbine_sync::store::StoreKind;

const MATERIAL_CSV: &str = "\u{feff}Plant,Material,Description,Plant-Specific Material Status,\
Batch Management(Plant),Serial No. Profile,Replacement Part,Used in a S-bom\n\
15S1,A9B-1001,\"Bearing, main\",Z1,X,SN01,B,\n\
20A1,A9B-2002,Pitch motor,Z3,,,N,X\n";

const TURBINE_CSV: &str = "Functional Loc.,Description,Maint Plant,Planning Plant,Platform,WT Short Name,\
Turbine Model,Mk Version,Revision,Nominal Power,Original Eq Manufact,SBOM for Turbine,SCADA Name,\
SCADA Park ID,SCADA Code,SCADA Functional Loc,Tech ID,Region,Technology,Hub Height,Tower Height,\
Turbine Class,Turbine Latitude,Turbine Longitude\n\
DK-15S1-WTG01,Turbine 1,15S1,15S1,4MW,WTG01,V136,Mk3,0,4200,OEM,S1,S-1,P1,C1,FL1,T1,North,Onshore,112,110,IIA,56.1234567,9.1\n\
DK-15S1-WTG02,Turbine 2,,15S1,4MW,WTG02,V136,Mk3,0,4200,OEM,S1,S-2,P1,C2,FL2,T2,North,Onshore,112,110,IIA,,\n";

async fn upload(app: &TestApp, csv: &str) -> (StatusCode, serde_json::Value) {
    app.post_multipart("/uploadFile", &[], &[("file", "upload.csv", csv.as_bytes())])
        .await
}

#[tokio::test]
async fn material_csv_is_staged_in_unprocessed_store() {
    let app = TestApp::new().await;

    let (status, body) = upload(&app, MATERIAL_CSV).await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["table"], "MaterialData");
    assert_eq!(body["data"]["rows"], 2);
    assert_eq!(body["data"]["imported"], 2);
    assert_eq!(app.count(StoreKind::Unprocessed, "MaterialData").await, 2);
    assert_eq!(app.count(StoreKind::Processed, "MaterialData").await, 0);

    let (status, body) = app.get("/fetch_UnprocessedMaterialData").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let rows = body["data"].as_array().expect("rows");
    assert_eq!(rows.len(), 2);
    let bearing = rows
        .iter()
        .find(|r| r["Material"] == "A9B-1001")
        .expect("bearing row");
    assert_eq!(bearing["Description"], "Bearing, main");
    assert_eq!(bearing["Serial_No_Profile"], "SN01");
    assert_eq!(bearing["PlantSpecificMaterialStatus"], "Z1");
}

#[tokio::test]
async fn reupload_upserts_by_material_and_plant() {
    let app = TestApp::new().await;

    upload(&app, MATERIAL_CSV).await;
    let (status, _) = upload(&app, MATERIAL_CSV).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(app.count(StoreKind::Unprocessed, "MaterialData").await, 2);
}

#[tokio::test]
async fn turbine_csv_is_detected_by_headers() {
    let app = TestApp::new().await;

    let (status, body) = upload(&app, TURBINE_CSV).await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["table"], "TurbineData");
    assert_eq!(app.count(StoreKind::Unprocessed, "TurbineData").await, 2);

    let (_, body) = app.get("/getMaintPlant").await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    let latitude = body["data"][0]["TurbineLatitude"].as_f64().expect("latitude");
    assert!((latitude - 56.123457).abs() < 1e-9, "{latitude}");

    let (_, body) = app.get("/getPlanningPlant").await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn unknown_headers_report_the_expected_set() {
    let app = TestApp::new().await;

    let (status, body) = upload(&app, "Material,Plant,Colour\nA9B-1001,15S1,red\n").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["expectedHeaders"]["Replacement Part"], "ReplacementPart");
    assert_eq!(body["expectedHeaders"]["Material"], "Material");
    assert_eq!(app.count(StoreKind::Unprocessed, "MaterialData").await, 0);
}

#[tokio::test]
async fn empty_and_header_only_files_are_rejected() {
    let app = TestApp::new().await;

    let (status, body) = upload(&app, "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["message"], "CSV file is empty");

    let header_only = MATERIAL_CSV.lines().next().unwrap_or_default().to_string() + "\n";
    let (status, body) = upload(&app, &header_only).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "CSV file has no data rows");
}

#[tokio::test]
async fn missing_file_field_is_rejected() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_multipart("/uploadFile", &[("note", "no file here")], &[])
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No file uploaded");
}

#[tokio::test]
async fn processed_turbines_need_a_maintenance_plant() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_json(
            "/uploadProcessedTurbineData",
            json!([
                { "FunctionalLoc": "DK-15S1-WTG01", "MaintPlant": "15S1", "TurbineLatitude": "56.1" },
                { "FunctionalLoc": "DK-15S1-WTG02" },
                { "MaintPlant": "15S1" }
            ]),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["imported"], 1);
    assert_eq!(body["data"]["skipped"], 2);
    assert_eq!(app.count(StoreKind::Processed, "TurbineData").await, 1);
}

#[tokio::test]
async fn non_array_upload_is_rejected() {
    let app = TestApp::new().await;

    let (status, _) = app
        .post_json("/uploadTurbinePredictionsData", json!({ "FunctionalLoc": "X" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.post_json("/uploadTurbinePredictionsData", json!([])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid or empty data array");
}

#[tokio::test]
async fn category_update_marks_rows_as_manual() {
    let app = TestApp::new().await;
    app.post_json(
        "/uploadProcessedMaterialData",
        json!([
            { "Material": "A9B-1001", "Plant": "15S1", "MaterialCategory": "Unknown", "Auto_Classified": 1 },
            { "Material": "A9B-1001", "Plant": "20A1", "MaterialCategory": "Unknown", "Auto_Classified": 1 }
        ]),
    )
    .await;

    let (status, body) = app
        .post_json(
            "/updateMaterialCategoryData",
            json!({ "selectedCategory": "Blades", "rows": [{ "Material": "A9B-1001", "Plant": "15S1" }] }),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["updated"], 1);
    let manual = app
        .scalar(
            StoreKind::Processed,
            "SELECT COUNT(*) AS n FROM \"MaterialData\" \
             WHERE \"MaterialCategory\" = 'Blades' AND \"Auto_Classified\" = 0",
        )
        .await;
    assert_eq!(manual, 1);

    let (status, _) = app
        .post_json(
            "/updateMaterialCategoryData",
            json!({ "selectedCategory": "  ", "rows": [{ "Material": "A9B-1001", "Plant": "15S1" }] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn violation_count_has_a_fixed_shape() {
    let app = TestApp::new().await;
    app.post_json(
        "/uploadProcessedMaterialData",
        json!([
            { "Material": "A9B-1001", "Plant": "15S1", "ViolationReplacementPart": "1" },
            { "Material": "A9B-2002", "Plant": "15S1", "ViolationReplacementPart": "0" }
        ]),
    )
    .await;

    let (status, body) = app.get("/getViolations").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "data": [{ "total_violations": 1 }] }));
}

#[tokio::test]
async fn health_endpoints_answer() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Turbine sync API is running");

    let (status, body) = app.get("/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["stores"].as_array().map(Vec::len), Some(3));
}
