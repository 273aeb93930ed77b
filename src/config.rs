use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::store::StoreKind;
use crate::sync::facts::TechnicianAssignment;

#[derive(Debug, Clone)]
pub enum Deployment {
    Local,
    Dev,
    Stage,
    Prod,
}

impl Deployment {
    #[must_use]
    pub fn from_label(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Self::Dev,
            "stage" | "staging" => Self::Stage,
            "prod" | "production" => Self::Prod,
            _ => Self::Local,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    // Stores
    pub unprocessed_database_url: String,
    pub processed_database_url: String,
    pub predictions_database_url: String,

    // Write fan-out
    pub mirror_stores: Vec<StoreKind>,
    pub plant_stores: Vec<StoreKind>,
    pub fault_report_assignment: TechnicianAssignment,

    // Assets and external process
    pub geo_mapping_path: PathBuf,
    pub python_bin: String,
    pub etl_script_path: PathBuf,

    // API settings
    pub api_host: String,
    pub api_port: u16,
    pub max_body_bytes: usize,

    // Rate limiting
    pub disable_rate_limiting: bool,
    pub rate_limit_sync_per_second: u64,
    pub rate_limit_sync_burst: u32,
    pub rate_limit_read_per_second: u64,
    pub rate_limit_read_burst: u32,

    // Application metadata
    pub log_format: LogFormat,
    pub deployment: Deployment,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            unprocessed_database_url: "sqlite://data/unprocessed.db?mode=rwc".to_string(),
            processed_database_url: "sqlite://data/processed.db?mode=rwc".to_string(),
            predictions_database_url: "sqlite://data/predictions.db?mode=rwc".to_string(),
            mirror_stores: vec![StoreKind::Processed, StoreKind::Predictions],
            plant_stores: vec![StoreKind::Predictions],
            fault_report_assignment: TechnicianAssignment::Random,
            geo_mapping_path: PathBuf::from("assets/geo_mapping.json"),
            python_bin: "python3".to_string(),
            etl_script_path: PathBuf::from("../Backend/main.py"),
            api_host: "0.0.0.0".to_string(),
            api_port: 8000,
            max_body_bytes: 25 * 1024 * 1024,
            disable_rate_limiting: false,
            rate_limit_sync_per_second: 5,
            rate_limit_sync_burst: 50,
            rate_limit_read_per_second: 20,
            rate_limit_read_burst: 100,
            log_format: LogFormat::Text,
            deployment: Deployment::Local,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every variable is optional. Unparsable numbers and booleans fall back to
    /// their defaults; unparsable store lists and assignment strategies are errors.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidStore` or `ConfigError::InvalidAssignment`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            // Stores
            unprocessed_database_url: env::var("UNPROCESSED_DATABASE_URL")
                .unwrap_or(defaults.unprocessed_database_url),
            processed_database_url: env::var("PROCESSED_DATABASE_URL")
                .unwrap_or(defaults.processed_database_url),
            predictions_database_url: env::var("PREDICTIONS_DATABASE_URL")
                .unwrap_or(defaults.predictions_database_url),

            // Write fan-out
            mirror_stores: match env::var("MIRROR_STORES") {
                Ok(list) => parse_store_list(&list)?,
                Err(_) => defaults.mirror_stores,
            },
            plant_stores: match env::var("PLANT_STORES") {
                Ok(list) => parse_store_list(&list)?,
                Err(_) => defaults.plant_stores,
            },
            fault_report_assignment: match env::var("FAULT_REPORT_ASSIGNMENT") {
                Ok(name) => TechnicianAssignment::from_str(&name)
                    .map_err(|_| ConfigError::InvalidAssignment(name))?,
                Err(_) => defaults.fault_report_assignment,
            },

            // Assets and external process
            geo_mapping_path: env::var("GEO_MAPPING_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.geo_mapping_path),
            python_bin: env::var("PYTHON_BIN").unwrap_or(defaults.python_bin),
            etl_script_path: env::var("ETL_SCRIPT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.etl_script_path),

            // API settings
            api_host: env::var("API_HOST").unwrap_or(defaults.api_host),
            api_port: env::var("API_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .unwrap_or(defaults.api_port),
            max_body_bytes: env::var("MAX_BODY_BYTES")
                .unwrap_or_else(|_| "26214400".to_string())
                .parse()
                .unwrap_or(defaults.max_body_bytes), // 25MB default

            // Rate limiting
            disable_rate_limiting: env::var("DISABLE_RATE_LIMITING")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            rate_limit_sync_per_second: env::var("RATE_LIMIT_SYNC_PER_SECOND")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(defaults.rate_limit_sync_per_second),
            rate_limit_sync_burst: env::var("RATE_LIMIT_SYNC_BURST")
                .unwrap_or_else(|_| "50".to_string())
                .parse()
                .unwrap_or(defaults.rate_limit_sync_burst),
            rate_limit_read_per_second: env::var("RATE_LIMIT_READ_PER_SECOND")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .unwrap_or(defaults.rate_limit_read_per_second),
            rate_limit_read_burst: env::var("RATE_LIMIT_READ_BURST")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .unwrap_or(defaults.rate_limit_read_burst),

            // Application metadata
            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Text,
            },
            deployment: Deployment::from_label(
                &env::var("DEPLOYMENT").unwrap_or_else(|_| "local".to_string()),
            ),
        })
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }

    /// Connection URL for one of the three stores.
    #[must_use]
    pub fn database_url(&self, kind: StoreKind) -> &str {
        match kind {
            StoreKind::Unprocessed => &self.unprocessed_database_url,
            StoreKind::Processed => &self.processed_database_url,
            StoreKind::Predictions => &self.predictions_database_url,
        }
    }
}

/// Parse a comma-separated store list such as `processed,predictions`.
fn parse_store_list(list: &str) -> Result<Vec<StoreKind>, ConfigError> {
    let mut stores = Vec::new();
    for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let kind = StoreKind::from_str(name).map_err(|_| ConfigError::InvalidStore(name.to_string()))?;
        if !stores.contains(&kind) {
            stores.push(kind);
        }
    }
    if stores.is_empty() {
        return Err(ConfigError::InvalidStore(list.to_string()));
    }
    Ok(stores)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown store name in list: {0}")]
    InvalidStore(String),

    #[error("Unknown technician assignment strategy: {0}")]
    InvalidAssignment(String),
}
