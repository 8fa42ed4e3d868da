//! Catalog harvest pipeline.
//!
//! Walks the listing API page by page until the source signals end of
//! data, upserting each page as one batch. Pages are strictly sequential;
//! there is no checkpointing — a failed run aborts and the next run
//! starts again from page 1, relying on upsert idempotency.

use async_trait::async_trait;
use pillfeed_common::{DrugOverviewRecord, Result};
use pillfeed_db::OverviewRepository;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::sources::{CatalogSource, PageOutcome};

/// Destination for harvested pages.
#[async_trait]
pub trait OverviewSink: Send + Sync {
    /// Upsert one page of records atomically; returns the count stored.
    async fn upsert_page(&self, records: &[DrugOverviewRecord]) -> Result<usize>;
}

#[async_trait]
impl OverviewSink for OverviewRepository {
    async fn upsert_page(&self, records: &[DrugOverviewRecord]) -> Result<usize> {
        OverviewRepository::upsert_page(self, records).await
    }
}

/// Why a harvest run stopped normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The source returned an empty `items` array: pagination exhausted.
    EmptyPage,
    /// The response envelope lacked the `body.items` path, which the
    /// source contract makes indistinguishable from end of data.
    MalformedEnvelope,
}

#[derive(Debug, Clone, Serialize)]
pub struct HarvestResult {
    pub pages_processed: u32,
    pub total_records: usize,
    pub stop_reason: StopReason,
}

/// Run the harvest to completion.
///
/// Transport failures, non-success statuses, and database errors abort
/// the run immediately; the two content-driven stop signals terminate it
/// normally with the reason recorded in the result.
pub async fn run_harvest<S, K>(source: &S, sink: &K) -> Result<HarvestResult>
where
    S: CatalogSource + ?Sized,
    K: OverviewSink + ?Sized,
{
    let mut page = 1u32;
    let mut total_records = 0usize;

    info!("Starting catalog harvest");

    loop {
        let outcome = source.fetch_page(page).await.map_err(|e| {
            error!(page, error = %e, "Page fetch failed, aborting run");
            e
        })?;

        match outcome {
            PageOutcome::Items(records) => {
                let count = sink.upsert_page(&records).await.map_err(|e| {
                    error!(page, error = %e, "Page upsert failed, aborting run");
                    e
                })?;
                total_records += count;
                info!(page, count, total = total_records, "Page stored");
                page += 1;
            }
            PageOutcome::Empty => {
                let result = HarvestResult {
                    pages_processed: page - 1,
                    total_records,
                    stop_reason: StopReason::EmptyPage,
                };
                info!(
                    pages = result.pages_processed,
                    total = result.total_records,
                    "Pagination exhausted"
                );
                return Ok(result);
            }
            PageOutcome::Malformed => {
                warn!(page, "Response envelope missing body.items; treating as end of data");
                return Ok(HarvestResult {
                    pages_processed: page - 1,
                    total_records,
                    stop_reason: StopReason::MalformedEnvelope,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pillfeed_common::PillfeedError;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    fn record(item_seq: &str) -> DrugOverviewRecord {
        DrugOverviewRecord {
            item_seq: item_seq.to_string(),
            entp_name: "제조사".to_string(),
            item_name: "제품".to_string(),
            efficacy_text: None,
            use_method_text: None,
            warning_text_1: None,
            warning_text_2: None,
            interaction_text: None,
            side_effect_text: None,
            storage_method_text: None,
            update_date: "2024-01-05".to_string(),
        }
    }

    /// Source that replays a fixed sequence of page results.
    struct ScriptedSource {
        pages: Mutex<VecDeque<Result<PageOutcome>>>,
    }

    impl ScriptedSource {
        fn new(pages: Vec<Result<PageOutcome>>) -> Self {
            Self { pages: Mutex::new(pages.into()) }
        }
    }

    #[async_trait]
    impl CatalogSource for ScriptedSource {
        async fn fetch_page(&self, _page: u32) -> Result<PageOutcome> {
            self.pages
                .lock()
                .unwrap()
                .pop_front()
                .expect("fetched past the scripted pages")
        }
    }

    /// Sink that records every page it receives.
    #[derive(Default)]
    struct MemorySink {
        pages: Mutex<Vec<Vec<DrugOverviewRecord>>>,
    }

    #[async_trait]
    impl OverviewSink for MemorySink {
        async fn upsert_page(&self, records: &[DrugOverviewRecord]) -> Result<usize> {
            self.pages.lock().unwrap().push(records.to_vec());
            Ok(records.len())
        }
    }

    #[tokio::test]
    async fn test_stops_on_empty_page() {
        let source = ScriptedSource::new(vec![
            Ok(PageOutcome::Items(vec![record("1"), record("2")])),
            Ok(PageOutcome::Items(vec![record("3"), record("4"), record("5")])),
            Ok(PageOutcome::Empty),
        ]);
        let sink = MemorySink::default();

        let result = run_harvest(&source, &sink).await.unwrap();
        assert_eq!(result.pages_processed, 2);
        assert_eq!(result.total_records, 5);
        assert_eq!(result.stop_reason, StopReason::EmptyPage);
        assert_eq!(sink.pages.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_stops_on_malformed_envelope() {
        let source = ScriptedSource::new(vec![
            Ok(PageOutcome::Items(vec![record("1")])),
            Ok(PageOutcome::Malformed),
        ]);
        let sink = MemorySink::default();

        let result = run_harvest(&source, &sink).await.unwrap();
        assert_eq!(result.pages_processed, 1);
        assert_eq!(result.total_records, 1);
        assert_eq!(result.stop_reason, StopReason::MalformedEnvelope);
    }

    #[tokio::test]
    async fn test_malformed_first_page_processes_nothing() {
        let source = ScriptedSource::new(vec![Ok(PageOutcome::Malformed)]);
        let sink = MemorySink::default();

        let result = run_harvest(&source, &sink).await.unwrap();
        assert_eq!(result.pages_processed, 0);
        assert_eq!(result.total_records, 0);
        assert!(sink.pages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_api_error_aborts_run() {
        let source = ScriptedSource::new(vec![
            Ok(PageOutcome::Items(vec![record("1")])),
            Err(PillfeedError::Api { status: 500 }),
        ]);
        let sink = MemorySink::default();

        let err = run_harvest(&source, &sink).await.unwrap_err();
        assert!(matches!(err, PillfeedError::Api { status: 500 }));
        // The first page was already committed before the abort.
        assert_eq!(sink.pages.lock().unwrap().len(), 1);
    }
}
