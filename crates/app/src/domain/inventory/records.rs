//! Inventory Records

use jiff_sqlx::Timestamp as SqlxTimestamp;
use martina::{
    catalog::ProductUuid,
    inventory::{BatchUuid, InventoryBatch},
};
use sqlx::{FromRow, Row, postgres::PgRow};

#[derive(Debug, Clone)]
pub(crate) struct InventoryBatchRecord(pub InventoryBatch);

impl<'r> FromRow<'r, PgRow> for InventoryBatchRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self(InventoryBatch {
            uuid: BatchUuid::from_uuid(row.try_get("uuid")?),
            product: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            quantity: row.try_get("quantity")?,
            is_current: row.try_get("is_current")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        }))
    }
}
