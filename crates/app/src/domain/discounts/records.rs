//! Discount Records

use jiff_sqlx::Timestamp as SqlxTimestamp;
use martina::{
    catalog::{CategoryUuid, ProductUuid, VendorUuid},
    discounts::{Bulk, Coupon, Discount, DiscountKind, DiscountScope, DiscountUuid},
};
use rust_decimal::Decimal;
use sqlx::{FromRow, Row, postgres::PgRow};
use uuid::Uuid;

/// Discount row joined with its product and category scope.
#[derive(Debug, Clone)]
pub(crate) struct DiscountRecord(pub Discount);

impl<'r> FromRow<'r, PgRow> for DiscountRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let kind: String = row.try_get("kind")?;

        let kind = kind
            .parse::<DiscountKind>()
            .map_err(|error| sqlx::Error::ColumnDecode {
                index: "kind".to_string(),
                source: Box::new(error),
            })?;

        let coupon = row
            .try_get::<Option<String>, _>("coupon_code")?
            .map(|code| -> sqlx::Result<Coupon> {
                Ok(Coupon {
                    code,
                    percentage: row.try_get::<Option<Decimal>, _>("coupon_percentage")?,
                    fixed: row.try_get("coupon_fixed")?,
                })
            })
            .transpose()?;

        let bulk = match (
            row.try_get::<Option<i32>, _>("bulk_buy")?,
            row.try_get::<Option<i32>, _>("bulk_get")?,
        ) {
            (Some(buy), Some(get)) => Some(Bulk { buy, get }),
            _ => None,
        };

        let products: Vec<Uuid> = row.try_get("product_uuids")?;
        let categories: Vec<Uuid> = row.try_get("category_uuids")?;

        Ok(Self(Discount {
            uuid: DiscountUuid::from_uuid(row.try_get("uuid")?),
            kind,
            discounter: VendorUuid::from_uuid(row.try_get("discounter_uuid")?),
            scope: DiscountScope {
                products: products.into_iter().map(ProductUuid::from_uuid).collect(),
                categories: categories.into_iter().map(CategoryUuid::from_uuid).collect(),
            },
            coupon,
            percentage: row.try_get("percentage")?,
            fixed: row.try_get("fixed")?,
            bulk,
            free_shipping: row.try_get("free_shipping")?,
            valid_from: row
                .try_get::<Option<SqlxTimestamp>, _>("valid_from")?
                .map(SqlxTimestamp::to_jiff),
            usage_limit: row.try_get("usage_limit")?,
            used: row.try_get("used")?,
            expiry_date: row
                .try_get::<Option<SqlxTimestamp>, _>("expiry_date")?
                .map(SqlxTimestamp::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        }))
    }
}
