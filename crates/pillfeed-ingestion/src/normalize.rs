//! Restriction dataset normalizer.
//!
//! Rebuilds the two restriction snapshot tables from five categorized
//! delimited extracts. The extracts ship in the legacy Korean encoding
//! (windows-949) with occasional UTF-8 re-exports, so decoding tries
//! EUC-KR first and falls back to strict UTF-8. Both tables are
//! truncated once at run start, before any file is read; a run whose
//! files all fail still leaves the tables empty.
//!
//! The five categories share no common row schema. Dispatch is by
//! category identity, one match arm per variant, never by sniffing
//! file content.

use encoding_rs::EUC_KR;
use pillfeed_common::{
    CombinationRestrictionRecord, PillfeedError, RestrictionCategory, RestrictionRecord, Result,
};
use pillfeed_config::RestrictionFiles;
use pillfeed_db::RestrictionRepository;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct NormalizeResult {
    /// Records stored across all files that processed cleanly.
    pub total_records: usize,
    /// One message per failed file; the run continues past each.
    pub errors: Vec<String>,
}

/// Run the normalizer: truncate both destination tables, then process
/// each category file independently. Truncation failure is fatal; a
/// file failure is logged and skipped.
pub async fn run_normalize(
    files: &RestrictionFiles,
    repo: &RestrictionRepository,
) -> Result<NormalizeResult> {
    info!("Clearing restriction snapshot tables");
    repo.truncate_all().await?;

    let mut result = NormalizeResult { total_records: 0, errors: Vec::new() };

    for (category, path) in files.iter() {
        info!(category = category.as_str(), path = %path.display(), "Processing restriction file");
        match process_file(category, path, repo).await {
            Ok(count) => {
                info!(category = category.as_str(), count, "File stored");
                result.total_records += count;
            }
            Err(e) => {
                let msg = format!("{}: {e}", category.as_str());
                warn!("{}", &msg);
                result.errors.push(msg);
            }
        }
    }

    info!(
        total = result.total_records,
        failed_files = result.errors.len(),
        "Normalizer run complete"
    );
    Ok(result)
}

async fn process_file(
    category: RestrictionCategory,
    path: &Path,
    repo: &RestrictionRepository,
) -> Result<usize> {
    let text = decode_source(path).await?;
    let batch = parse_category(category, &text)
        .map_err(|e| source_read(path, format!("row parse failed: {e}")))?;

    match batch {
        CategoryBatch::Single(records) => repo.insert_restrictions(&records).await,
        CategoryBatch::Pairwise(records) => repo.insert_combinations(&records).await,
    }
}

/// Read a source file and decode it, EUC-KR first, strict UTF-8 second.
async fn decode_source(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| source_read(path, e.to_string()))?;

    let (decoded, _, had_errors) = EUC_KR.decode(&bytes);
    if !had_errors {
        return Ok(decoded.into_owned());
    }

    String::from_utf8(bytes)
        .map_err(|e| source_read(path, format!("neither EUC-KR nor UTF-8: {e}")))
}

fn source_read(path: &Path, reason: String) -> PillfeedError {
    PillfeedError::SourceRead { path: path.display().to_string(), reason }
}

/// A parsed file's batch, shaped for one of the two destination tables.
pub enum CategoryBatch {
    Single(Vec<RestrictionRecord>),
    Pairwise(Vec<CombinationRestrictionRecord>),
}

// ── Source row shapes ─────────────────────────────────────────────────────────
// Every field is optional and resolved once, here at the mapping boundary.
// Column names are the extracts' own headers.

#[derive(Debug, Deserialize)]
struct AgeRow {
    #[serde(rename = "제품코드")]
    item_code: Option<String>,
    #[serde(rename = "제품명")]
    item_name: Option<String>,
    #[serde(rename = "특정연령")]
    age: Option<String>,
    #[serde(rename = "특정연령단위")]
    age_unit: Option<String>,
    #[serde(rename = "연령처리조건")]
    condition: Option<String>,
    #[serde(rename = "상세정보")]
    detail: Option<String>,
    #[serde(rename = "비고")]
    remark: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PregnancyRow {
    #[serde(rename = "제품코드")]
    item_code: Option<String>,
    #[serde(rename = "제품명")]
    item_name: Option<String>,
    #[serde(rename = "금기등급")]
    grade: Option<String>,
    #[serde(rename = "상세정보")]
    detail: Option<String>,
    #[serde(rename = "비고")]
    remark: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ElderlyRow {
    #[serde(rename = "제품코드")]
    item_code: Option<String>,
    #[serde(rename = "제품명")]
    item_name: Option<String>,
    #[serde(rename = "약품상세정보")]
    detail: Option<String>,
    #[serde(rename = "비고")]
    remark: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CombinationRow {
    #[serde(rename = "제품코드A")]
    item_code_a: Option<String>,
    #[serde(rename = "제품명A")]
    item_name_a: Option<String>,
    #[serde(rename = "제품코드B")]
    item_code_b: Option<String>,
    #[serde(rename = "제품명B")]
    item_name_b: Option<String>,
    #[serde(rename = "상세정보")]
    detail: Option<String>,
    #[serde(rename = "비고")]
    remark: Option<String>,
}

// ── Field coercion ────────────────────────────────────────────────────────────

/// Missing cell becomes an empty string; a present cell is trimmed.
/// No null ever reaches a text column.
fn clean_text(value: Option<String>) -> String {
    value.map(|s| s.trim().to_string()).unwrap_or_default()
}

/// First space-separated token, matching how the age extracts pad their
/// value columns ("65 이상" → "65").
fn first_token(s: &str) -> &str {
    s.split(' ').next().unwrap_or_default()
}

// ── Per-category transformation ───────────────────────────────────────────────

/// Parse one decoded file into its destination batch, applying the
/// category's composition rule to every row.
pub fn parse_category(
    category: RestrictionCategory,
    text: &str,
) -> std::result::Result<CategoryBatch, csv::Error> {
    let mut reader = csv::Reader::from_reader(text.as_bytes());

    match category {
        RestrictionCategory::Age => {
            let type_name = category.type_name().unwrap_or_default();
            let mut records = Vec::new();
            for row in reader.deserialize() {
                let row: AgeRow = row?;
                let prohibited_content = format!(
                    "{}{} {} 금기. {}",
                    first_token(&clean_text(row.age)),
                    first_token(&clean_text(row.age_unit)),
                    first_token(&clean_text(row.condition)),
                    clean_text(row.detail),
                );
                records.push(RestrictionRecord {
                    item_code: clean_text(row.item_code),
                    item_name: clean_text(row.item_name),
                    type_name: type_name.to_string(),
                    prohibited_content,
                    remark: clean_text(row.remark),
                });
            }
            Ok(CategoryBatch::Single(records))
        }

        RestrictionCategory::Pregnancy => {
            let type_name = category.type_name().unwrap_or_default();
            let mut records = Vec::new();
            for row in reader.deserialize() {
                let row: PregnancyRow = row?;
                let prohibited_content = format!(
                    "[등급 {}] {}",
                    clean_text(row.grade),
                    clean_text(row.detail),
                );
                records.push(RestrictionRecord {
                    item_code: clean_text(row.item_code),
                    item_name: clean_text(row.item_name),
                    type_name: type_name.to_string(),
                    prohibited_content,
                    remark: clean_text(row.remark),
                });
            }
            Ok(CategoryBatch::Single(records))
        }

        RestrictionCategory::Elderly | RestrictionCategory::ElderlyNsaid => {
            let type_name = category.type_name().unwrap_or_default();
            let mut records = Vec::new();
            for row in reader.deserialize() {
                let row: ElderlyRow = row?;
                records.push(RestrictionRecord {
                    item_code: clean_text(row.item_code),
                    item_name: clean_text(row.item_name),
                    type_name: type_name.to_string(),
                    prohibited_content: clean_text(row.detail),
                    remark: clean_text(row.remark),
                });
            }
            Ok(CategoryBatch::Single(records))
        }

        RestrictionCategory::Combination => {
            let mut records = Vec::new();
            for row in reader.deserialize() {
                let row: CombinationRow = row?;
                records.push(CombinationRestrictionRecord {
                    item_code_a: clean_text(row.item_code_a),
                    item_name_a: clean_text(row.item_name_a),
                    item_code_b: clean_text(row.item_code_b),
                    item_name_b: clean_text(row.item_name_b),
                    prohibited_content: clean_text(row.detail),
                    remark: clean_text(row.remark),
                });
            }
            Ok(CategoryBatch::Pairwise(records))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn single_records(batch: CategoryBatch) -> Vec<RestrictionRecord> {
        match batch {
            CategoryBatch::Single(records) => records,
            CategoryBatch::Pairwise(_) => panic!("expected single-item batch"),
        }
    }

    #[test]
    fn test_age_composition() {
        let csv = "제품코드,제품명,특정연령,특정연령단위,연령처리조건,상세정보,비고\n\
                   A0001,아세트정,65,세,초과,투여주의,허가사항 참조\n";
        let records = single_records(parse_category(RestrictionCategory::Age, csv).unwrap());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].type_name, "연령금기");
        assert_eq!(records[0].prohibited_content, "65세 초과 금기. 투여주의");
        assert_eq!(records[0].item_code, "A0001");
        assert_eq!(records[0].remark, "허가사항 참조");
    }

    #[test]
    fn test_age_first_token_only() {
        let csv = "제품코드,제품명,특정연령,특정연령단위,연령처리조건,상세정보,비고\n\
                   A0002,시럽제,12 개월미만,개월 단위,미만 처리,신장독성,\n";
        let records = single_records(parse_category(RestrictionCategory::Age, csv).unwrap());
        assert_eq!(records[0].prohibited_content, "12개월 미만 금기. 신장독성");
    }

    #[test]
    fn test_pregnancy_composition() {
        let csv = "제품코드,제품명,금기등급,상세정보,비고\n\
                   B0001,레티노정,2,태아독성,\n";
        let records = single_records(parse_category(RestrictionCategory::Pregnancy, csv).unwrap());
        assert_eq!(records[0].type_name, "임부금기");
        assert_eq!(records[0].prohibited_content, "[등급 2] 태아독성");
        assert_eq!(records[0].remark, "");
    }

    #[test]
    fn test_elderly_verbatim() {
        let csv = "제품코드,제품명,약품상세정보,비고\n\
                   C0001,디아제팜정,장기 투여 시 주의,\n";
        let records = single_records(parse_category(RestrictionCategory::Elderly, csv).unwrap());
        assert_eq!(records[0].type_name, "노인주의");
        assert_eq!(records[0].prohibited_content, "장기 투여 시 주의");

        let records =
            single_records(parse_category(RestrictionCategory::ElderlyNsaid, csv).unwrap());
        assert_eq!(records[0].type_name, "노인주의(해열진통소염제)");
    }

    #[test]
    fn test_combination_order_preserved() {
        let csv = "제품코드A,제품명A,제품코드B,제품명B,상세정보,비고\n\
                   D0001,케토롤락정,D0002,아스피린정,출혈 위험 증가,\n";
        let batch = parse_category(RestrictionCategory::Combination, csv).unwrap();
        let records = match batch {
            CategoryBatch::Pairwise(records) => records,
            CategoryBatch::Single(_) => panic!("expected pairwise batch"),
        };
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].item_code_a, "D0001");
        assert_eq!(records[0].item_code_b, "D0002");
        assert_eq!(records[0].prohibited_content, "출혈 위험 증가");
    }

    #[test]
    fn test_missing_detail_column_coalesces_to_empty() {
        // No 상세정보 column at all: the composed text keeps its shape
        // with an empty detail component, never a placeholder.
        let csv = "제품코드,제품명,금기등급\nB0002,레티노크림,2\n";
        let records = single_records(parse_category(RestrictionCategory::Pregnancy, csv).unwrap());
        assert_eq!(records[0].prohibited_content, "[등급 2] ");
        assert_eq!(records[0].remark, "");

        let csv = "제품코드,제품명\nC0002,로라제팜정\n";
        let records = single_records(parse_category(RestrictionCategory::Elderly, csv).unwrap());
        assert_eq!(records[0].prohibited_content, "");
    }

    #[test]
    fn test_clean_text_trims_and_defaults() {
        assert_eq!(clean_text(Some("  투여주의  ".to_string())), "투여주의");
        assert_eq!(clean_text(Some("\t65 \n".to_string())), "65");
        assert_eq!(clean_text(None), "");
    }

    #[test]
    fn test_first_token() {
        assert_eq!(first_token("65 이상"), "65");
        assert_eq!(first_token("세"), "세");
        assert_eq!(first_token(""), "");
    }

    #[tokio::test]
    async fn test_decode_euc_kr_primary() {
        let text = "제품코드,제품명,약품상세정보,비고\nC0001,디아제팜정,장기 투여 시 주의,\n";
        let (encoded, _, _) = EUC_KR.encode(text);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&encoded).unwrap();

        let decoded = decode_source(file.path()).await.unwrap();
        assert_eq!(decoded, text);
    }

    #[tokio::test]
    async fn test_decode_utf8_fallback() {
        // Leading "가" (0xEA 0xB0 0x80 in UTF-8) cannot decode as EUC-KR:
        // the 0x80 byte is never a valid lead, so the fallback must fire.
        let text = "가격,제품명\n1000,디아제팜정\n";
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();

        let decoded = decode_source(file.path()).await.unwrap();
        assert_eq!(decoded, text);
    }

    #[tokio::test]
    async fn test_decode_failure_is_source_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xFF, 0xFF, 0xFF, 0x00]).unwrap();

        let err = decode_source(file.path()).await.unwrap_err();
        assert!(matches!(err, PillfeedError::SourceRead { .. }));
    }

    #[tokio::test]
    async fn test_missing_file_is_source_read() {
        let err = decode_source(Path::new("no-such-extract.csv")).await.unwrap_err();
        assert!(matches!(err, PillfeedError::SourceRead { .. }));
    }
}
