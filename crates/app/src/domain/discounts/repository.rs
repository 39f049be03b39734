//! Discounts Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use martina::{
    catalog::{CategoryUuid, ProductUuid},
    discounts::{Discount, DiscountUuid},
};
use sqlx::{Postgres, Transaction, query, query_as};
use uuid::Uuid;

use crate::domain::discounts::records::DiscountRecord;

const CANDIDATE_DISCOUNTS_SQL: &str = include_str!("sql/candidate_discounts.sql");
const FIND_ACTIVE_COUPONS_SQL: &str = include_str!("sql/find_active_coupons.sql");
const REDEEM_COUPON_SQL: &str = include_str!("sql/redeem_coupon.sql");
const RELEASE_COUPON_SQL: &str = include_str!("sql/release_coupon.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgDiscountsRepository;

impl PgDiscountsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn candidate_discounts(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        products: &[ProductUuid],
        categories: &[CategoryUuid],
        codes: &[String],
    ) -> Result<Vec<Discount>, sqlx::Error> {
        let products: Vec<Uuid> = products.iter().map(|uuid| uuid.into_uuid()).collect();
        let categories: Vec<Uuid> = categories.iter().map(|uuid| uuid.into_uuid()).collect();

        let records: Vec<DiscountRecord> = query_as(CANDIDATE_DISCOUNTS_SQL)
            .bind(&products)
            .bind(&categories)
            .bind(codes)
            .fetch_all(&mut **tx)
            .await?;

        Ok(records
            .into_iter()
            .map(|DiscountRecord(discount)| discount)
            .collect())
    }

    pub(crate) async fn find_active_coupons(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        codes: &[String],
        now: Timestamp,
    ) -> Result<Vec<Discount>, sqlx::Error> {
        let records: Vec<DiscountRecord> = query_as(FIND_ACTIVE_COUPONS_SQL)
            .bind(codes)
            .bind(SqlxTimestamp::from(now))
            .fetch_all(&mut **tx)
            .await?;

        Ok(records
            .into_iter()
            .map(|DiscountRecord(discount)| discount)
            .collect())
    }

    pub(crate) async fn redeem_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        discount: DiscountUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(REDEEM_COUPON_SQL)
            .bind(discount.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn release_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        discount: DiscountUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(RELEASE_COUPON_SQL)
            .bind(discount.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}
