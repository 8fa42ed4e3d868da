//! PostgreSQL repository for drug overview records.
//!
//! Handles:
//! - Page-batch upsert keyed by `item_seq`
//! - On conflict, only `update_date` and `efficacy_text` are refreshed;
//!   all other columns keep their first-inserted values

use pillfeed_common::{DrugOverviewRecord, Result};
use sqlx::PgPool;

use crate::schema::TABLE_DRUG_OVERVIEW;

/// PostgreSQL overview repository.
#[derive(Clone)]
pub struct OverviewRepository {
    pool: PgPool,
}

impl OverviewRepository {
    pub fn new(pool: PgPool) -> Self { Self { pool } }

    /// Expose underlying pool for test setup.
    pub fn pool(&self) -> &PgPool { &self.pool }

    /// Upsert one page of records in a single transaction.
    /// A page is fully visible or fully rolled back.
    pub async fn upsert_page(&self, records: &[DrugOverviewRecord]) -> Result<usize> {
        if records.is_empty() { return Ok(0); }
        let mut tx = self.pool.begin().await?;
        let mut count = 0;

        let sql = format!(
            r#"
            INSERT INTO {TABLE_DRUG_OVERVIEW}
                (item_seq, entp_name, item_name,
                 efficacy_text, use_method_text,
                 warning_text_1, warning_text_2,
                 interaction_text, side_effect_text,
                 storage_method_text, update_date)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
            ON CONFLICT (item_seq) DO UPDATE SET
                update_date = EXCLUDED.update_date,
                efficacy_text = EXCLUDED.efficacy_text
            "#
        );

        for record in records {
            sqlx::query(&sql)
                .bind(&record.item_seq)
                .bind(&record.entp_name)
                .bind(&record.item_name)
                .bind(&record.efficacy_text)
                .bind(&record.use_method_text)
                .bind(&record.warning_text_1)
                .bind(&record.warning_text_2)
                .bind(&record.interaction_text)
                .bind(&record.side_effect_text)
                .bind(&record.storage_method_text)
                .bind(&record.update_date)
                .execute(&mut *tx)
                .await?;
            count += 1;
        }

        tx.commit().await?;
        tracing::debug!("upsert_page: committed {count} records");
        Ok(count)
    }

    /// Total overview rows in the database.
    pub async fn count(&self) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {TABLE_DRUG_OVERVIEW}");
        let n = sqlx::query_scalar(&sql)
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }
}
