use std::sync::Arc;

use crate::config::Config;
use crate::etl::{EtlRunner, PythonEtl};
use crate::geo::GeoTable;
use crate::store::DataStore;

#[derive(Clone)]
pub struct AppState {
    pub store: DataStore,
    pub config: Arc<Config>,
    pub geo: Arc<GeoTable>,
    pub etl: Arc<dyn EtlRunner>,
}

impl AppState {
    /// Build state with the geo table loaded from `config.geo_mapping_path` and
    /// the Python ETL runner configured from `config`.
    pub fn new(store: DataStore, config: Config) -> Self {
        let geo = GeoTable::load_or_empty(&config.geo_mapping_path);
        let etl = PythonEtl::new(&config.python_bin, &config.etl_script_path);
        Self::with_parts(store, config, geo, Arc::new(etl))
    }

    /// Build state from explicit collaborators.
    pub fn with_parts(
        store: DataStore,
        config: Config,
        geo: GeoTable,
        etl: Arc<dyn EtlRunner>,
    ) -> Self {
        Self {
            store,
            config: Arc::new(config),
            geo: Arc::new(geo),
            etl,
        }
    }
}
