//! PostgreSQL repository for restriction snapshots.
//!
//! A normalizer run truncates both destination tables once, then bulk
//! inserts one batch per source file. Each batch is one transaction.

use pillfeed_common::{CombinationRestrictionRecord, RestrictionRecord, Result};
use sqlx::PgPool;

use crate::schema::{TABLE_COMBINATION_INFO, TABLE_DUR_INFO};

/// PostgreSQL restriction repository.
#[derive(Clone)]
pub struct RestrictionRepository {
    pool: PgPool,
}

impl RestrictionRepository {
    pub fn new(pool: PgPool) -> Self { Self { pool } }

    /// Expose underlying pool for test setup.
    pub fn pool(&self) -> &PgPool { &self.pool }

    /// Empty both destination tables. Runs once at the start of every
    /// normalizer run, before any file is read.
    pub async fn truncate_all(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let sql = format!("TRUNCATE TABLE {TABLE_DUR_INFO}");
        sqlx::query(&sql).execute(&mut *tx).await?;
        let sql = format!("TRUNCATE TABLE {TABLE_COMBINATION_INFO}");
        sqlx::query(&sql).execute(&mut *tx).await?;
        tx.commit().await?;
        tracing::debug!("truncate_all: destination tables emptied");
        Ok(())
    }

    /// Bulk insert one file's single-item restriction batch.
    pub async fn insert_restrictions(&self, records: &[RestrictionRecord]) -> Result<usize> {
        if records.is_empty() { return Ok(0); }
        let mut tx = self.pool.begin().await?;
        let mut count = 0;

        let sql = format!(
            r#"
            INSERT INTO {TABLE_DUR_INFO}
                (item_code, item_name, type_name, prohibited_content, remark)
            VALUES ($1,$2,$3,$4,$5)
            "#
        );

        for record in records {
            sqlx::query(&sql)
                .bind(&record.item_code)
                .bind(&record.item_name)
                .bind(&record.type_name)
                .bind(&record.prohibited_content)
                .bind(&record.remark)
                .execute(&mut *tx)
                .await?;
            count += 1;
        }

        tx.commit().await?;
        tracing::debug!("insert_restrictions: committed {count} records");
        Ok(count)
    }

    /// Bulk insert one file's combination restriction batch.
    pub async fn insert_combinations(
        &self,
        records: &[CombinationRestrictionRecord],
    ) -> Result<usize> {
        if records.is_empty() { return Ok(0); }
        let mut tx = self.pool.begin().await?;
        let mut count = 0;

        let sql = format!(
            r#"
            INSERT INTO {TABLE_COMBINATION_INFO}
                (item_code_a, item_name_a, item_code_b, item_name_b,
                 prohibited_content, remark)
            VALUES ($1,$2,$3,$4,$5,$6)
            "#
        );

        for record in records {
            sqlx::query(&sql)
                .bind(&record.item_code_a)
                .bind(&record.item_name_a)
                .bind(&record.item_code_b)
                .bind(&record.item_name_b)
                .bind(&record.prohibited_content)
                .bind(&record.remark)
                .execute(&mut *tx)
                .await?;
            count += 1;
        }

        tx.commit().await?;
        tracing::debug!("insert_combinations: committed {count} records");
        Ok(count)
    }

    /// Single-item restriction rows currently in the database.
    pub async fn restriction_count(&self) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {TABLE_DUR_INFO}");
        let n = sqlx::query_scalar(&sql)
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    /// Combination restriction rows currently in the database.
    pub async fn combination_count(&self) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {TABLE_COMBINATION_INFO}");
        let n = sqlx::query_scalar(&sql)
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }
}
