//! sea-orm entities for the dimension, fact and staging tables.
//!
//! Analytic tables are written through `store::tables` and read as JSON, so they
//! have no entity here.

pub mod fault_report;
pub mod location;
pub mod material;
pub mod material_data;
pub mod plant;
pub mod replacement_part;
pub mod serial_number_profile;
pub mod technician;
pub mod turbine_data;
