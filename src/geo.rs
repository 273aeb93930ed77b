//! Plant-code prefix to coordinate lookup.

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::common::lenient::opt_f64;

/// Used when a prefix has no usable entry.
pub const FALLBACK_LATITUDE: f64 = 55.9429;
pub const FALLBACK_LONGITUDE: f64 = 9.1257;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
    pub defaulted: bool,
}

/// Static `prefix -> [lat, lon]` table, keyed by the first two characters of a
/// plant code.
#[derive(Debug, Clone, Default)]
pub struct GeoTable {
    entries: HashMap<String, [f64; 2]>,
}

/// `[lat, lon, ..]` with both leading items numeric (or numeric strings).
fn coordinates(value: &Value) -> Option<[f64; 2]> {
    match value.as_array()?.as_slice() {
        [lat, lon, ..] => Some([opt_f64(lat)?, opt_f64(lon)?]),
        _ => None,
    }
}

impl GeoTable {
    #[must_use]
    pub fn new(entries: HashMap<String, [f64; 2]>) -> Self {
        Self { entries }
    }

    /// Parse a JSON object of `"prefix": [lat, lon]`.
    ///
    /// Entries without two leading numbers are logged and left out, so only
    /// their prefixes fall back.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the document is not an object.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let raw: HashMap<String, Value> = serde_json::from_str(raw)?;
        let entries = raw
            .into_iter()
            .filter_map(|(prefix, value)| match coordinates(&value) {
                Some(point) => Some((prefix, point)),
                None => {
                    tracing::warn!(prefix = %prefix, entry = %value, "Ignoring geo mapping entry without coordinates");
                    None
                }
            })
            .collect();
        Ok(Self::new(entries))
    }

    /// Load the table from disk. A missing or malformed file is logged and
    /// yields an empty table, so every lookup falls back.
    pub fn load_or_empty(path: &Path) -> Self {
        let loaded = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|raw| Self::from_json(&raw).map_err(|e| e.to_string()));

        match loaded {
            Ok(table) => {
                tracing::info!(path = %path.display(), prefixes = table.len(), "Geo mapping loaded");
                table
            }
            Err(error) => {
                tracing::error!(path = %path.display(), %error, "Failed to load geo mapping, using fallback coordinates");
                Self::default()
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn resolve(&self, code: &str) -> GeoPoint {
        let prefix: String = code.trim().chars().take(2).collect();
        match self.entries.get(&prefix) {
            Some(&[lat, lon]) => GeoPoint {
                lat,
                lon,
                defaulted: false,
            },
            None => GeoPoint {
                lat: FALLBACK_LATITUDE,
                lon: FALLBACK_LONGITUDE,
                defaulted: true,
            },
        }
    }
}
