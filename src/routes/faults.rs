use std::collections::HashMap;

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Envelope;
use crate::common::AppState;
use crate::error::{AppError, AppResult};
use crate::sync::facts::{self, FaultReportSummary, NewFaultReport, TechnicianAssignment};

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncFaultReportsRequest {
    /// Overrides the configured strategy for this run.
    pub technician_assignment: Option<TechnicianAssignment>,
}

/// Multipart form fields of a manual fault report.
#[derive(Debug, Deserialize, ToSchema)]
pub struct FaultReportRequest {
    #[serde(rename = "Technician_ID")]
    pub technician_id: i32,
    #[serde(rename = "TurbineLocation")]
    pub turbine_location: i32,
    #[serde(rename = "Report_Date")]
    pub report_date: String,
    #[serde(rename = "Fault_Description")]
    pub fault_description: String,
    #[serde(rename = "Fault_Type")]
    pub fault_type: Option<String>,
    #[serde(rename = "Material_ID")]
    pub material_id: Option<i32>,
    #[serde(rename = "Report_Status")]
    pub report_status: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub attachment: Option<Vec<u8>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FaultReportCreated {
    pub report_id: i32,
}

/// Generate open "Replacement Part" fault reports for every turbine at a
/// plant with a replacement-part fact
///
/// At most one open report exists per (location, material). The body is
/// optional; without it the configured technician strategy applies.
#[utoipa::path(
    post,
    path = "/syncFaultReportsController",
    request_body(content = SyncFaultReportsRequest, description = "Optional; an empty body uses the configured strategy"),
    responses(
        (status = 200, description = "Fault reports synced", body = Envelope<FaultReportSummary>),
        (status = 400, description = "Malformed body"),
        (status = 500, description = "Database failure, nothing kept"),
    ),
    tag = "faults"
)]
pub async fn sync_fault_reports(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<Envelope<FaultReportSummary>>> {
    let request: SyncFaultReportsRequest = if body.iter().all(u8::is_ascii_whitespace) {
        SyncFaultReportsRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(format!("Invalid body: {e}")))?
    };

    let assignment = request
        .technician_assignment
        .unwrap_or(state.config.fault_report_assignment);
    let summary = facts::sync_fault_reports(&state.store, assignment).await?;
    Ok(Envelope::ok("Fault reports synced successfully", summary))
}

fn required<'a>(fields: &'a HashMap<String, String>, name: &str) -> AppResult<&'a str> {
    fields
        .get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("Missing required field: {name}")))
}

fn parse_id(name: &str, raw: &str) -> AppResult<i32> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Field {name} must be an integer")))
}

fn optional(fields: &HashMap<String, String>, name: &str) -> Option<String> {
    fields
        .get(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// File a fault report by hand, with an optional attachment
#[utoipa::path(
    post,
    path = "/uploadFaultReport",
    request_body(content = FaultReportRequest, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Fault report created", body = Envelope<FaultReportCreated>),
        (status = 400, description = "Missing or malformed required field"),
        (status = 500, description = "Database failure, e.g. unknown technician or location"),
    ),
    tag = "faults"
)]
pub async fn upload_fault_report(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<Envelope<FaultReportCreated>>)> {
    let mut fields = HashMap::new();
    let mut attachment = None;

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if name == "attachment" {
            attachment = Some(field.bytes().await?.to_vec());
        } else {
            fields.insert(name, field.text().await?);
        }
    }

    let report = NewFaultReport {
        technician_id: parse_id("Technician_ID", required(&fields, "Technician_ID")?)?,
        turbine_location: parse_id("TurbineLocation", required(&fields, "TurbineLocation")?)?,
        report_date: required(&fields, "Report_Date")?.to_string(),
        fault_description: required(&fields, "Fault_Description")?.to_string(),
        fault_type: optional(&fields, "Fault_Type"),
        material_id: optional(&fields, "Material_ID")
            .map(|raw| parse_id("Material_ID", &raw))
            .transpose()?,
        report_status: optional(&fields, "Report_Status"),
        attachment: attachment.filter(|bytes| !bytes.is_empty()),
    };

    let report_id = facts::insert_fault_report(&state.store, report).await?;
    Ok((
        StatusCode::CREATED,
        Envelope::ok("Fault report submitted successfully", FaultReportCreated { report_id }),
    ))
}
