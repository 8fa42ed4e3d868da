//! Catalog source clients.

pub mod easydrug;

use async_trait::async_trait;
use pillfeed_common::{DrugOverviewRecord, Result};

/// What one page of the listing API yielded.
///
/// `Empty` and `Malformed` are the two legitimate stop signals of the
/// source contract; neither is an error. Transport failures and
/// non-success HTTP statuses surface as `Err` from `fetch_page` instead.
#[derive(Debug, Clone)]
pub enum PageOutcome {
    Items(Vec<DrugOverviewRecord>),
    Empty,
    Malformed,
}

/// Common interface for the paginated catalog listing.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch one page (1-based) and classify its envelope.
    async fn fetch_page(&self, page: u32) -> Result<PageOutcome>;
}
