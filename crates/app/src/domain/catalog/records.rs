//! Catalog Records

use jiff_sqlx::Timestamp as SqlxTimestamp;
use martina::catalog::{
    Attribute, AttributeUuid, Category, CategoryUuid, ImageRef, Product, ProductUuid, VendorUuid,
};
use sqlx::{FromRow, Row, postgres::PgRow, types::Json};

/// Product row, without its categories and attributes.
#[derive(Debug, Clone)]
pub(crate) struct ProductRecord(pub Product);

/// Category row, keyed by the product it belongs to.
#[derive(Debug, Clone)]
pub(crate) struct CategoryRecord {
    pub product: ProductUuid,
    pub category: Category,
}

/// Attribute row.
#[derive(Debug, Clone)]
pub(crate) struct AttributeRecord(pub Attribute);

impl<'r> FromRow<'r, PgRow> for ProductRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let Json(images): Json<Vec<ImageRef>> = row.try_get("images")?;

        Ok(Self(Product {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            vendor: VendorUuid::from_uuid(row.try_get("vendor_uuid")?),
            name: row.try_get("name")?,
            price: row.try_get("price")?,
            sold_count: row.try_get("sold_count")?,
            images,
            categories: Vec::new(),
            attributes: Vec::new(),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        }))
    }
}

impl<'r> FromRow<'r, PgRow> for CategoryRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            product: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            category: Category {
                uuid: CategoryUuid::from_uuid(row.try_get("uuid")?),
                name: row.try_get("name")?,
            },
        })
    }
}

impl<'r> FromRow<'r, PgRow> for AttributeRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self(Attribute {
            uuid: AttributeUuid::from_uuid(row.try_get("uuid")?),
            product: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            name: row.try_get("name")?,
            value: row.try_get("value")?,
            extra_price: row.try_get("extra_price")?,
        }))
    }
}
