//! Integration tests for generated and manual fault reports.
//!
//! Run with: cargo test --test fault_report_test

mod support;

use axum::http::StatusCode;
use serde_json::json;

use support::TestApp;
use turbine_sync::store::StoreKind;

/// Two turbines at 15S1 share one replacement-part fact; 20A1 has none.
async fn seeded() -> TestApp {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_json(
            "/uploadMaterialPredictionsData",
            json!([{ "Material": "A9B-1001", "Plant": "15S1", "ReplacementPart": "B" }]),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (status, body) = app
        .post_json(
            "/uploadTurbinePredictionsData",
            json!([
                { "FunctionalLoc": "DK-15S1-WTG01", "MaintPlant": "15S1" },
                { "FunctionalLoc": "DK-15S1-WTG02", "MaintPlant": "15S1" },
                { "FunctionalLoc": "DE-20A1-WTG01", "MaintPlant": "20A1" }
            ]),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    app.post_json(
        "/syncPlantCoordinates",
        json!({ "plants": [{ "code": "15S1", "isPlant": true }, { "code": "20A1", "isPlant": true }] }),
    )
    .await;
    let (status, _) = app
        .post_json("/syncMaterialData", json!({ "materials": ["A9B-1001"] }))
        .await;
    assert_eq!(status, StatusCode::OK);
    app
}

async fn add_technicians(app: &TestApp) {
    app.exec(
        StoreKind::Predictions,
        "INSERT INTO \"Technician\" (\"Name\", \"Surname\") VALUES ('Ana', 'Holm'), ('Bo', 'Lund')",
    )
    .await;
}

#[tokio::test]
async fn one_open_report_per_location_and_material() {
    let app = seeded().await;
    add_technicians(&app).await;

    let (status, body) = app.post_empty("/syncFaultReportsController").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["created"], 2);
    assert_eq!(body["data"]["existing"], 0);
    assert_eq!(body["data"]["unassigned"], 0);

    let (status, body) = app.post_empty("/syncFaultReportsController").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["created"], 0);
    assert_eq!(body["data"]["existing"], 2);
    assert_eq!(app.count(StoreKind::Predictions, "FaultReport").await, 2);

    let assigned = app
        .scalar(
            StoreKind::Predictions,
            "SELECT COUNT(*) AS n FROM \"FaultReport\" \
             WHERE \"Technician_ID\" IN (SELECT \"Technician_ID\" FROM \"Technician\") \
             AND \"Fault_Type\" = 'Replacement Part' AND \"Report_Status\" = 'Open'",
        )
        .await;
    assert_eq!(assigned, 2);
}

#[tokio::test]
async fn closed_report_allows_a_new_one() {
    let app = seeded().await;
    add_technicians(&app).await;

    app.post_empty("/syncFaultReportsController").await;
    app.exec(
        StoreKind::Predictions,
        "UPDATE \"FaultReport\" SET \"Report_Status\" = 'Closed' WHERE \"Report_ID\" = \
         (SELECT MIN(\"Report_ID\") FROM \"FaultReport\")",
    )
    .await;

    let (_, body) = app.post_empty("/syncFaultReportsController").await;
    assert_eq!(body["data"]["created"], 1);
    assert_eq!(body["data"]["existing"], 1);
    assert_eq!(app.count(StoreKind::Predictions, "FaultReport").await, 3);
}

#[tokio::test]
async fn unassigned_strategy_leaves_technician_empty() {
    let app = seeded().await;
    add_technicians(&app).await;

    let (status, body) = app
        .post_json(
            "/syncFaultReportsController",
            json!({ "technicianAssignment": "unassigned" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["created"], 2);
    assert_eq!(body["data"]["unassigned"], 2);
    let empty = app
        .scalar(
            StoreKind::Predictions,
            "SELECT COUNT(*) AS n FROM \"FaultReport\" WHERE \"Technician_ID\" IS NULL",
        )
        .await;
    assert_eq!(empty, 2);
}

#[tokio::test]
async fn random_strategy_without_technicians_stays_unassigned() {
    let app = seeded().await;

    let (status, body) = app.post_empty("/syncFaultReportsController").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["created"], 2);
    assert_eq!(body["data"]["unassigned"], 2);
}

#[tokio::test]
async fn none_is_accepted_as_unassigned() {
    let app = seeded().await;
    add_technicians(&app).await;

    let (status, body) = app
        .post_json("/syncFaultReportsController", json!({ "technicianAssignment": "none" }))
        .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["unassigned"], 2);
}

#[tokio::test]
async fn unknown_strategy_is_rejected() {
    let app = seeded().await;

    let (status, body) = app
        .post_json(
            "/syncFaultReportsController",
            json!({ "technicianAssignment": "round-robin" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(app.count(StoreKind::Predictions, "FaultReport").await, 0);
}

#[tokio::test]
async fn manual_report_with_attachment_is_created() {
    let app = TestApp::new().await;
    add_technicians(&app).await;
    app.exec(
        StoreKind::Predictions,
        "INSERT INTO \"Location\" (\"Location_Name\") VALUES ('DK-15S1-WTG01')",
    )
    .await;

    let (status, body) = app
        .post_multipart(
            "/uploadFaultReport",
            &[
                ("Technician_ID", "1"),
                ("TurbineLocation", "1"),
                ("Report_Date", "2025-03-14"),
                ("Fault_Description", "Gearbox noise at rated power"),
                ("Fault_Type", "Inspection"),
            ],
            &[("attachment", "photo.jpg", &b"\xff\xd8\xff\xe0fake-jpeg"[..])],
        )
        .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["success"], true);
    let report_id = body["data"]["report_id"].as_i64().expect("report id");

    let size = app
        .scalar(
            StoreKind::Predictions,
            &format!("SELECT length(\"Attachment\") AS n FROM \"FaultReport\" WHERE \"Report_ID\" = {report_id}"),
        )
        .await;
    assert_eq!(size, 13);

    let open = app
        .scalar(
            StoreKind::Predictions,
            "SELECT COUNT(*) AS n FROM \"FaultReport\" WHERE \"Report_Status\" = 'Open'",
        )
        .await;
    assert_eq!(open, 1);
}

#[tokio::test]
async fn manual_report_requires_every_mandatory_field() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_multipart(
            "/uploadFaultReport",
            &[
                ("Technician_ID", "1"),
                ("TurbineLocation", "1"),
                ("Report_Date", "2025-03-14"),
            ],
            &[],
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing required field: Fault_Description");
    assert_eq!(app.count(StoreKind::Predictions, "FaultReport").await, 0);
}

#[tokio::test]
async fn manual_report_for_unknown_location_fails() {
    let app = TestApp::new().await;
    add_technicians(&app).await;

    let (status, body) = app
        .post_multipart(
            "/uploadFaultReport",
            &[
                ("Technician_ID", "1"),
                ("TurbineLocation", "42"),
                ("Report_Date", "2025-03-14"),
                ("Fault_Description", "Yaw drive"),
            ],
            &[],
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(app.count(StoreKind::Predictions, "FaultReport").await, 0);
}

#[tokio::test]
async fn turbine_sync_creates_each_location_once() {
    let app = seeded().await;

    let (status, body) = app.post_empty("/syncTurbineData").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["created"], 3);

    let (_, body) = app.post_empty("/syncTurbineData").await;
    assert_eq!(body["data"]["created"], 0);
    assert_eq!(app.count(StoreKind::Predictions, "Location").await, 3);
}

#[tokio::test]
async fn report_reads_flag_attachments_and_name_technicians() {
    let app = seeded().await;
    add_technicians(&app).await;
    app.post_empty("/syncFaultReportsController").await;
    let (status, body) = app
        .post_multipart(
            "/uploadFaultReport",
            &[
                ("Technician_ID", "2"),
                ("TurbineLocation", "1"),
                ("Report_Date", "2025-03-14"),
                ("Fault_Description", "Gearbox noise"),
            ],
            &[("attachment", "photo.jpg", &b"\xff\xd8\xff\xe0fake-jpeg"[..])],
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (status, body) = app.get("/getFaultReports").await;
    assert_eq!(status, StatusCode::OK);
    let reports = body["data"].as_array().expect("reports");
    assert_eq!(reports.len(), 3);
    assert!(reports.iter().all(|r| r.get("Attachment").is_none()));
    assert!(reports.iter().all(|r| r["Report_ID"].is_i64()));
    assert_eq!(reports[0]["HasAttachment"], 0);
    assert_eq!(reports[0]["Fault_Type"], "Replacement Part");
    assert_eq!(reports[2]["HasAttachment"], 1);
    assert_eq!(reports[2]["Fault_Description"], "Gearbox noise");

    let (status, body) = app.get("/verifyTechnicianLinks").await;
    assert_eq!(status, StatusCode::OK);
    let links = body["data"].as_array().expect("links");
    assert_eq!(links.len(), 3);
    for link in &links[..2] {
        assert!(link["Name"] == "Ana" || link["Name"] == "Bo", "{link}");
    }
    assert_eq!(links[2]["Technician_ID"], 2);
    assert_eq!(links[2]["Name"], "Bo");
    assert_eq!(links[2]["Surname"], "Lund");
}
