//! Catalog service.

use async_trait::async_trait;
use martina::catalog::{Attribute, AttributeUuid, Product, ProductUuid};
use mockall::automock;
use rustc_hash::FxHashSet;

use crate::{
    database::Db,
    domain::catalog::{
        errors::CatalogServiceError, models::SoldUnits, repository::PgCatalogRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgCatalogService {
    db: Db,
    repository: PgCatalogRepository,
}

impl PgCatalogService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCatalogRepository::new(),
        }
    }
}

#[async_trait]
impl CatalogService for PgCatalogService {
    async fn read_products(
        &self,
        products: &[ProductUuid],
    ) -> Result<Vec<Product>, CatalogServiceError> {
        let requested: FxHashSet<ProductUuid> = products.iter().copied().collect();

        let mut tx = self.db.begin().await?;

        let found = self.repository.get_products(&mut tx, products).await?;

        tx.commit().await?;

        if found.len() < requested.len() {
            return Err(CatalogServiceError::NotFound);
        }

        Ok(found)
    }

    async fn find_attributes(
        &self,
        attributes: &[AttributeUuid],
    ) -> Result<Vec<Attribute>, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let found = self.repository.find_attributes(&mut tx, attributes).await?;

        tx.commit().await?;

        Ok(found)
    }

    #[tracing::instrument(
        name = "catalog.service.increment_sold_counts",
        skip(self, sold),
        fields(product_count = sold.len()),
        err
    )]
    async fn increment_sold_counts(&self, sold: &[SoldUnits]) -> Result<(), CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.repository.increment_sold_counts(&mut tx, sold).await?;

        if rows_affected != sold.len() as u64 {
            return Err(CatalogServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    #[tracing::instrument(
        name = "catalog.service.decrement_sold_counts",
        skip(self, sold),
        fields(product_count = sold.len()),
        err
    )]
    async fn decrement_sold_counts(&self, sold: &[SoldUnits]) -> Result<(), CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        self.repository.decrement_sold_counts(&mut tx, sold).await?;

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Reads products with their categories and attributes.
    ///
    /// Products come back in request order, each once. Fails with `NotFound`
    /// when any requested product does not exist.
    async fn read_products(
        &self,
        products: &[ProductUuid],
    ) -> Result<Vec<Product>, CatalogServiceError>;

    /// Returns the attributes that exist among `attributes`.
    async fn find_attributes(
        &self,
        attributes: &[AttributeUuid],
    ) -> Result<Vec<Attribute>, CatalogServiceError>;

    /// Adds units to product sold counters.
    async fn increment_sold_counts(&self, sold: &[SoldUnits]) -> Result<(), CatalogServiceError>;

    /// Takes units back off product sold counters, never below zero.
    async fn decrement_sold_counts(&self, sold: &[SoldUnits]) -> Result<(), CatalogServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::catalog::models::SoldUnits,
        test::{TestContext, helpers},
    };

    use super::*;

    #[tokio::test]
    #[ignore = "requires a Docker daemon for the Postgres test container"]
    async fn read_products_loads_categories_and_attributes() -> TestResult {
        let ctx = TestContext::new().await;
        let vendor = helpers::create_vendor(&ctx).await?;
        let lamp = helpers::create_product(&ctx, vendor, "Desk Lamp", 5_000).await?;
        let lighting = helpers::create_category(&ctx, vendor, lamp, "Lighting").await?;
        let brass = helpers::create_attribute(&ctx, lamp, "finish", "brass", Some(250)).await?;

        let products = ctx.catalog.read_products(&[lamp]).await?;

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].price, 5_000);
        assert_eq!(products[0].category_uuids(), vec![lighting]);
        assert_eq!(products[0].attributes[0].uuid, brass);
        assert_eq!(products[0].attributes[0].extra_price, Some(250));

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for the Postgres test container"]
    async fn read_products_preserves_request_order() -> TestResult {
        let ctx = TestContext::new().await;
        let vendor = helpers::create_vendor(&ctx).await?;
        let lamp = helpers::create_product(&ctx, vendor, "Desk Lamp", 5_000).await?;
        let chair = helpers::create_product(&ctx, vendor, "Armchair", 12_000).await?;

        let products = ctx.catalog.read_products(&[chair, lamp]).await?;
        let uuids: Vec<ProductUuid> = products.iter().map(|product| product.uuid).collect();

        assert_eq!(uuids, vec![chair, lamp]);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for the Postgres test container"]
    async fn read_products_with_unknown_id_is_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let vendor = helpers::create_vendor(&ctx).await?;
        let lamp = helpers::create_product(&ctx, vendor, "Desk Lamp", 5_000).await?;

        let result = ctx.catalog.read_products(&[lamp, ProductUuid::new()]).await;

        assert!(
            matches!(result, Err(CatalogServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for the Postgres test container"]
    async fn sold_counts_move_both_ways_but_never_below_zero() -> TestResult {
        let ctx = TestContext::new().await;
        let vendor = helpers::create_vendor(&ctx).await?;
        let lamp = helpers::create_product(&ctx, vendor, "Desk Lamp", 5_000).await?;

        ctx.catalog
            .increment_sold_counts(&[SoldUnits {
                product: lamp,
                quantity: 3,
            }])
            .await?;

        ctx.catalog
            .decrement_sold_counts(&[SoldUnits {
                product: lamp,
                quantity: 5,
            }])
            .await?;

        let products = ctx.catalog.read_products(&[lamp]).await?;

        assert_eq!(products[0].sold_count, 3);

        ctx.catalog
            .decrement_sold_counts(&[SoldUnits {
                product: lamp,
                quantity: 2,
            }])
            .await?;

        let products = ctx.catalog.read_products(&[lamp]).await?;

        assert_eq!(products[0].sold_count, 1);

        Ok(())
    }
}
