//! CSV uploads into the unprocessed staging store.
//!
//! The header row decides the target table. It has to match one of the known
//! header maps exactly (column order is free); anything else is rejected with
//! the expected headers of the closest schema.

use std::collections::{BTreeMap, BTreeSet};

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::store::{DataStore, StoreKind};
use crate::sync::ImportSummary;
use crate::sync::staging::{MaterialRecord, TurbineRecord, upload_materials, upload_turbines};

/// Maps CSV header text to a staging column.
#[derive(Debug, Clone, Copy)]
pub struct CsvSchema {
    pub table: &'static str,
    pub headers: &'static [(&'static str, &'static str)],
}

pub const MATERIAL_SCHEMA: CsvSchema = CsvSchema {
    table: "MaterialData",
    headers: &[
        ("Material", "Material"),
        ("Description", "Description"),
        ("Plant", "Plant"),
        ("Plant-Specific Material Status", "PlantSpecificMaterialStatus"),
        ("Batch Management(Plant)", "BatchManagementPlant"),
        ("Serial No. Profile", "Serial_No_Profile"),
        ("Replacement Part", "ReplacementPart"),
        ("Used in a S-bom", "UsedInSBom"),
    ],
};

pub const TURBINE_SCHEMA: CsvSchema = CsvSchema {
    table: "TurbineData",
    headers: &[
        ("Functional Loc.", "FunctionalLoc"),
        ("Description", "Description"),
        ("Maint Plant", "MaintPlant"),
        ("Planning Plant", "PlanningPlant"),
        ("Platform", "Platform"),
        ("WT Short Name", "WTShortName"),
        ("Turbine Model", "TurbineModel"),
        ("Mk Version", "MkVersion"),
        ("Revision", "Revision"),
        ("Nominal Power", "NominalPower"),
        ("Original Eq Manufact", "OriginalEqManufact"),
        ("SBOM for Turbine", "SBOMForTurbine"),
        ("SCADA Name", "SCADAName"),
        ("SCADA Park ID", "SCADAParkID"),
        ("SCADA Code", "SCADACode"),
        ("SCADA Functional Loc", "SCADAFunctionalLoc"),
        ("Tech ID", "TechID"),
        ("Region", "Region"),
        ("Technology", "Technology"),
        ("Hub Height", "HubHeight"),
        ("Tower Height", "TowerHeight"),
        ("Turbine Class", "TurbineClass"),
        ("Turbine Latitude", "TurbineLatitude"),
        ("Turbine Longitude", "TurbineLongitude"),
    ],
};

const SCHEMAS: [CsvSchema; 2] = [MATERIAL_SCHEMA, TURBINE_SCHEMA];

impl CsvSchema {
    fn header_set(&self) -> BTreeSet<&'static str> {
        self.headers.iter().map(|(header, _)| *header).collect()
    }

    fn column(&self, header: &str) -> Option<&'static str> {
        self.headers
            .iter()
            .find(|(h, _)| *h == header)
            .map(|(_, column)| *column)
    }

    fn expected(&self) -> BTreeMap<&'static str, &'static str> {
        self.headers.iter().copied().collect()
    }
}

/// Pick the schema whose header set equals `headers`.
///
/// # Errors
///
/// Returns `InvalidHeaders` with the expected map of the schema sharing the
/// most headers with the upload.
pub fn detect_schema(headers: &[String]) -> AppResult<CsvSchema> {
    let uploaded: BTreeSet<&str> = headers.iter().map(String::as_str).collect();

    if let Some(schema) = SCHEMAS.iter().find(|s| s.header_set() == uploaded) {
        return Ok(*schema);
    }

    let closest = SCHEMAS
        .iter()
        .max_by_key(|s| s.header_set().intersection(&uploaded).count())
        .unwrap_or(&MATERIAL_SCHEMA);
    tracing::warn!(?headers, closest = closest.table, "CSV header row matches no upload schema");
    Err(AppError::InvalidHeaders {
        expected: closest.expected(),
    })
}

fn clean_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_string()
}

/// Turn every data row into a record keyed by staging column names.
fn decode_rows<T>(schema: &CsvSchema, headers: &[String], rows: &[StringRecord]) -> AppResult<Vec<T>>
where
    T: DeserializeOwned,
{
    let columns: Vec<Option<&'static str>> = headers.iter().map(|h| schema.column(h)).collect();

    rows.iter()
        .map(|row| {
            let mut object = Map::new();
            for (column, cell) in columns.iter().zip(row.iter()) {
                if let Some(column) = column {
                    object.insert((*column).to_string(), Value::String(cell.to_string()));
                }
            }
            serde_json::from_value(Value::Object(object))
                .map_err(|e| AppError::BadRequest(format!("Invalid CSV row: {e}")))
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CsvUploadSummary {
    /// Staging table the rows went into.
    pub table: String,
    pub rows: usize,
    #[serde(flatten)]
    pub summary: ImportSummary,
}

/// Parse an uploaded CSV file and upsert its rows into the unprocessed store.
///
/// # Errors
///
/// Returns `BadRequest` for an unreadable or empty file, `InvalidHeaders` when
/// the header row matches no schema, or any database error.
pub async fn import_csv(store: &DataStore, bytes: &[u8]) -> AppResult<CsvUploadSummary> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::BadRequest(format!("Unreadable CSV: {e}")))?
        .iter()
        .map(clean_header)
        .collect();
    if headers.iter().all(String::is_empty) {
        return Err(AppError::BadRequest("CSV file is empty".to_string()));
    }

    let schema = detect_schema(&headers)?;

    let rows = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::BadRequest(format!("Unreadable CSV: {e}")))?;
    if rows.is_empty() {
        return Err(AppError::BadRequest("CSV file has no data rows".to_string()));
    }

    tracing::debug!(table = schema.table, rows = rows.len(), "CSV parsed");

    let summary = if schema.table == TURBINE_SCHEMA.table {
        let records: Vec<TurbineRecord> = decode_rows(&schema, &headers, &rows)?;
        upload_turbines(store, StoreKind::Unprocessed, &records, false).await?
    } else {
        let records: Vec<MaterialRecord> = decode_rows(&schema, &headers, &rows)?;
        upload_materials(store, StoreKind::Unprocessed, &records).await?
    };

    Ok(CsvUploadSummary {
        table: schema.table.to_string(),
        rows: rows.len(),
        summary,
    })
}
