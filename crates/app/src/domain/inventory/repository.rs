//! Inventory Repository

use martina::{
    catalog::ProductUuid,
    inventory::{InventoryBatch, StockDecrement},
};
use sqlx::{Postgres, Transaction, query, query_as};
use uuid::Uuid;

use crate::domain::inventory::records::InventoryBatchRecord;

const LIST_CURRENT_BATCHES_SQL: &str = include_str!("sql/list_current_batches.sql");
const LOCK_CURRENT_BATCHES_SQL: &str = include_str!("sql/lock_current_batches.sql");
const DECREMENT_BATCH_SQL: &str = include_str!("sql/decrement_batch.sql");
const RESTORE_BATCH_SQL: &str = include_str!("sql/restore_batch.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgInventoryRepository;

impl PgInventoryRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_current_batches(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        products: &[ProductUuid],
    ) -> Result<Vec<InventoryBatch>, sqlx::Error> {
        fetch_batches(tx, LIST_CURRENT_BATCHES_SQL, products).await
    }

    /// Same as [`Self::list_current_batches`], holding row locks until the
    /// transaction ends.
    pub(crate) async fn lock_current_batches(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        products: &[ProductUuid],
    ) -> Result<Vec<InventoryBatch>, sqlx::Error> {
        fetch_batches(tx, LOCK_CURRENT_BATCHES_SQL, products).await
    }

    pub(crate) async fn decrement_batch(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        decrement: &StockDecrement,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DECREMENT_BATCH_SQL)
            .bind(decrement.batch.into_uuid())
            .bind(decrement.quantity)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn restore_batch(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        decrement: &StockDecrement,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(RESTORE_BATCH_SQL)
            .bind(decrement.batch.into_uuid())
            .bind(decrement.quantity)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

async fn fetch_batches(
    tx: &mut Transaction<'_, Postgres>,
    sql: &'static str,
    products: &[ProductUuid],
) -> Result<Vec<InventoryBatch>, sqlx::Error> {
    let uuids: Vec<Uuid> = products.iter().map(|uuid| uuid.into_uuid()).collect();

    let records: Vec<InventoryBatchRecord> = query_as(sql)
        .bind(&uuids)
        .fetch_all(&mut **tx)
        .await?;

    Ok(records
        .into_iter()
        .map(|InventoryBatchRecord(batch)| batch)
        .collect())
}
