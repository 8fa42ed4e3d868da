//! Easy-drug catalog listing API client.
//!
//! The listing endpoint serves drug overview records in pages of 100,
//! JSON-encoded on request. Expected success envelope:
//! `{ body: { items: [ {itemSeq, entpName, itemName, ...}, ... ] } }`.
//! The API does not report a reliable total page count; termination is
//! driven by page content (see `PageOutcome`).

use async_trait::async_trait;
use pillfeed_common::{DrugOverviewRecord, PillfeedError, Result};
use pillfeed_config::CatalogConfig;
use std::time::Duration;
use tracing::debug;

use super::{CatalogSource, PageOutcome};

/// Records requested per page.
pub const PAGE_SIZE: u32 = 100;

/// Catalog listing client.
pub struct EasyDrugClient {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl EasyDrugClient {
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Pillfeed/0.1 (reference loader)")
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            service_key: config.service_key.clone(),
        })
    }
}

#[async_trait]
impl CatalogSource for EasyDrugClient {
    async fn fetch_page(&self, page: u32) -> Result<PageOutcome> {
        let page_no = page.to_string();
        let num_of_rows = PAGE_SIZE.to_string();
        let params = [
            ("serviceKey", self.service_key.as_str()),
            ("pageNo", page_no.as_str()),
            ("numOfRows", num_of_rows.as_str()),
            ("type", "json"),
        ];

        debug!(page, "Fetching catalog page");

        let resp = self.client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(PillfeedError::Api { status: resp.status().as_u16() });
        }

        let body: serde_json::Value = resp.json().await?;
        Ok(classify_page(&body))
    }
}

/// Classify a response body into one of the three page outcomes.
///
/// A missing `body.items` path is indistinguishable from end-of-data in
/// the source contract, so it is a stop signal rather than an error. An
/// `items` value that is not an array is treated the same way.
pub fn classify_page(body: &serde_json::Value) -> PageOutcome {
    match body["body"]["items"].as_array() {
        None => PageOutcome::Malformed,
        Some(items) if items.is_empty() => PageOutcome::Empty,
        Some(items) => PageOutcome::Items(items.iter().map(map_item).collect()),
    }
}

/// Map one catalog item to its overview record. Every lookup
/// null-coalesces; a missing external field is never fatal.
fn map_item(item: &serde_json::Value) -> DrugOverviewRecord {
    DrugOverviewRecord {
        item_seq: item["itemSeq"].as_str().unwrap_or("").to_string(),
        entp_name: item["entpName"].as_str().unwrap_or("").to_string(),
        item_name: item["itemName"].as_str().unwrap_or("").to_string(),
        efficacy_text: item["efcyQesitm"].as_str().map(String::from),
        use_method_text: item["useMethodQesitm"].as_str().map(String::from),
        warning_text_1: item["atpnWarnQesitm"].as_str().map(String::from),
        warning_text_2: item["atpnQesitm"].as_str().map(String::from),
        interaction_text: item["intrcQesitm"].as_str().map(String::from),
        side_effect_text: item["seQesitm"].as_str().map(String::from),
        storage_method_text: item["depositMethodQesitm"].as_str().map(String::from),
        update_date: item["updateDe"].as_str().unwrap_or("").to_string(),
    }
}
