//! Record types mirroring the destination tables.
//! These are Rust representations of the PostgreSQL reference tables.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Drug overview (catalog harvester output)
// ---------------------------------------------------------------------------

/// One row of the `drug_overview` table, keyed by the catalog's stable
/// item sequence number. Free-text answer fields are nullable because the
/// catalog omits them for many items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrugOverviewRecord {
    pub item_seq: String,
    pub entp_name: String,
    pub item_name: String,
    pub efficacy_text: Option<String>,
    pub use_method_text: Option<String>,
    pub warning_text_1: Option<String>,
    pub warning_text_2: Option<String>,
    pub interaction_text: Option<String>,
    pub side_effect_text: Option<String>,
    pub storage_method_text: Option<String>,
    /// Catalog-supplied date token, stored as-is and never reparsed.
    pub update_date: String,
}

// ---------------------------------------------------------------------------
// Restriction categories (normalizer input classes)
// ---------------------------------------------------------------------------

/// The five fixed classes of drug-safety restriction extract.
/// Dispatch is by this enum, never by sniffing file content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestrictionCategory {
    Age,
    Pregnancy,
    Elderly,
    ElderlyNsaid,
    Combination,
}

impl RestrictionCategory {
    /// Label written to the `type_name` column. `Combination` rows go to a
    /// separate pairwise table and carry no type label.
    pub fn type_name(&self) -> Option<&'static str> {
        match self {
            RestrictionCategory::Age          => Some("연령금기"),
            RestrictionCategory::Pregnancy    => Some("임부금기"),
            RestrictionCategory::Elderly      => Some("노인주의"),
            RestrictionCategory::ElderlyNsaid => Some("노인주의(해열진통소염제)"),
            RestrictionCategory::Combination  => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RestrictionCategory::Age          => "age",
            RestrictionCategory::Pregnancy    => "pregnancy",
            RestrictionCategory::Elderly      => "elderly",
            RestrictionCategory::ElderlyNsaid => "elderly_nsaid",
            RestrictionCategory::Combination  => "combination",
        }
    }
}

// ---------------------------------------------------------------------------
// Restriction rows (normalizer output)
// ---------------------------------------------------------------------------

/// One row of the `dur_info` table: a single-item restriction with a
/// composed human-readable description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestrictionRecord {
    pub item_code: String,
    pub item_name: String,
    pub type_name: String,
    pub prohibited_content: String,
    pub remark: String,
}

/// One row of the `dur_combination_info` table: a prohibited drug pair,
/// in the order given by the source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinationRestrictionRecord {
    pub item_code_a: String,
    pub item_name_a: String,
    pub item_code_b: String,
    pub item_name_b: String,
    pub prohibited_content: String,
    pub remark: String,
}
