//! Destination table names.
//!
//! Schema creation and indexing are owned by the deployment, not by the
//! pipelines; the only contract is the column sets written by the
//! repositories and the unique key on `drug_overview.item_seq`.

/// Overview table, upserted by the harvester.
pub const TABLE_DRUG_OVERVIEW: &str = "drug_overview";

/// Single-item restriction table, truncated and reloaded by the normalizer.
pub const TABLE_DUR_INFO: &str = "dur_info";

/// Pairwise combination restriction table, truncated and reloaded alongside.
pub const TABLE_COMBINATION_INFO: &str = "dur_combination_info";
