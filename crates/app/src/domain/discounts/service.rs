//! Discounts service.

use async_trait::async_trait;
use jiff::Timestamp;
use martina::{
    catalog::{CategoryUuid, ProductUuid},
    discounts::{Discount, DiscountUuid},
};
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::discounts::{errors::DiscountsServiceError, repository::PgDiscountsRepository},
};

#[derive(Debug, Clone)]
pub struct PgDiscountsService {
    db: Db,
    repository: PgDiscountsRepository,
}

impl PgDiscountsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgDiscountsRepository::new(),
        }
    }
}

#[async_trait]
impl DiscountsService for PgDiscountsService {
    #[tracing::instrument(
        name = "discounts.service.candidate_discounts",
        skip(self, products, categories, codes),
        fields(
            product_count = products.len(),
            category_count = categories.len(),
            code_count = codes.len(),
            candidate_count = tracing::field::Empty
        ),
        err
    )]
    async fn candidate_discounts(
        &self,
        products: &[ProductUuid],
        categories: &[CategoryUuid],
        codes: &[String],
    ) -> Result<Vec<Discount>, DiscountsServiceError> {
        let mut tx = self.db.begin().await?;

        let candidates = self
            .repository
            .candidate_discounts(&mut tx, products, categories, codes)
            .await?;

        tx.commit().await?;

        tracing::Span::current().record("candidate_count", candidates.len());

        Ok(candidates)
    }

    async fn find_active_coupons(
        &self,
        codes: &[String],
        now: Timestamp,
    ) -> Result<Vec<Discount>, DiscountsServiceError> {
        let mut tx = self.db.begin().await?;

        let coupons = self
            .repository
            .find_active_coupons(&mut tx, codes, now)
            .await?;

        tx.commit().await?;

        Ok(coupons)
    }

    #[tracing::instrument(
        name = "discounts.service.redeem_coupons",
        skip(self, discounts),
        fields(coupon_count = discounts.len()),
        err
    )]
    async fn redeem_coupons(&self, discounts: &[DiscountUuid]) -> Result<(), DiscountsServiceError> {
        let mut tx = self.db.begin().await?;

        for discount in discounts {
            let rows_affected = self.repository.redeem_coupon(&mut tx, *discount).await?;

            if rows_affected == 0 {
                return Err(DiscountsServiceError::Exhausted);
            }
        }

        tx.commit().await?;

        info!(coupon_count = discounts.len(), "redeemed coupons");

        Ok(())
    }

    #[tracing::instrument(
        name = "discounts.service.release_coupons",
        skip(self, discounts),
        fields(coupon_count = discounts.len()),
        err
    )]
    async fn release_coupons(&self, discounts: &[DiscountUuid]) -> Result<(), DiscountsServiceError> {
        let mut tx = self.db.begin().await?;

        for discount in discounts {
            self.repository.release_coupon(&mut tx, *discount).await?;
        }

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait DiscountsService: Send + Sync {
    /// Loads every discount scoped to one of `products` or `categories`, or
    /// carrying one of the coupon `codes`. Candidates are not filtered for
    /// validity.
    async fn candidate_discounts(
        &self,
        products: &[ProductUuid],
        categories: &[CategoryUuid],
        codes: &[String],
    ) -> Result<Vec<Discount>, DiscountsServiceError>;

    /// Returns the coupon discounts with one of `codes` that are active at `now`.
    async fn find_active_coupons(
        &self,
        codes: &[String],
        now: Timestamp,
    ) -> Result<Vec<Discount>, DiscountsServiceError>;

    /// Redeems each coupon once, all or nothing.
    ///
    /// Fails with `Exhausted` when a coupon has no uses left.
    async fn redeem_coupons(&self, discounts: &[DiscountUuid]) -> Result<(), DiscountsServiceError>;

    /// Gives back one use of each coupon.
    async fn release_coupons(&self, discounts: &[DiscountUuid]) -> Result<(), DiscountsServiceError>;
}
