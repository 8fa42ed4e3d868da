//! Pillfeed ingestion pipelines.
//!
//! Two independent batch jobs over public drug-safety reference data:
//! - `harvest` walks the paginated catalog listing API to exhaustion and
//!   upserts drug overview records, one transaction per page.
//! - `normalize` rebuilds the restriction snapshot tables from five
//!   categorized delimited extracts, one bulk insert per file.
//!
//! The pipelines share no in-memory state; they only meet in the database.

pub mod harvest;
pub mod normalize;
pub mod sources;

pub use harvest::{run_harvest, HarvestResult, OverviewSink, StopReason};
pub use normalize::{run_normalize, NormalizeResult};
pub use sources::easydrug::EasyDrugClient;
pub use sources::{CatalogSource, PageOutcome};
