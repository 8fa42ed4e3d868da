//! Pillfeed database layer.
//!
//! PostgreSQL repositories for the two ingestion pipelines:
//! - `drug_overview` upserts keyed by the catalog item sequence number
//! - `dur_info` / `dur_combination_info` truncate-then-load snapshots
//!
//! One pool is opened per pipeline run and not shared across runs.

pub mod database;
pub mod overview;
pub mod restrictions;
pub mod schema;

pub use database::connect;
pub use overview::OverviewRepository;
pub use restrictions::RestrictionRepository;
pub use schema::{TABLE_COMBINATION_INFO, TABLE_DRUG_OVERVIEW, TABLE_DUR_INFO};
