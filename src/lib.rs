//! Turbine sync - data synchronization backend for wind-turbine fleet
//! maintenance analytics
//!
//! This library exposes the core modules for testing and reuse.

pub mod common;
pub mod config;
pub mod entity;
pub mod error;
pub mod etl;
pub mod geo;
pub mod routes;
pub mod store;
pub mod sync;
pub mod upload;
