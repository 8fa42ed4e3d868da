//! pillfeed-common — Shared types and errors used across all Pillfeed crates.

pub mod error;
pub mod records;

// Re-export commonly used types
pub use error::{PillfeedError, Result};
pub use records::{
    CombinationRestrictionRecord, DrugOverviewRecord, RestrictionCategory, RestrictionRecord,
};
