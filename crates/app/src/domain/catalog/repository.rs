//! Catalog Repository

use martina::catalog::{Attribute, AttributeUuid, Product, ProductUuid};
use rustc_hash::FxHashMap;
use sqlx::{Postgres, Transaction, query, query_as};
use tracing::debug;
use uuid::Uuid;

use crate::domain::catalog::{
    models::SoldUnits,
    records::{AttributeRecord, CategoryRecord, ProductRecord},
};

const GET_PRODUCTS_SQL: &str = include_str!("sql/get_products.sql");
const LIST_PRODUCT_CATEGORIES_SQL: &str = include_str!("sql/list_product_categories.sql");
const LIST_PRODUCT_ATTRIBUTES_SQL: &str = include_str!("sql/list_product_attributes.sql");
const FIND_ATTRIBUTES_SQL: &str = include_str!("sql/find_attributes.sql");
const INCREMENT_SOLD_COUNTS_SQL: &str = include_str!("sql/increment_sold_counts.sql");
const DECREMENT_SOLD_COUNTS_SQL: &str = include_str!("sql/decrement_sold_counts.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCatalogRepository;

impl PgCatalogRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Loads products with their categories and attributes, in request order.
    #[tracing::instrument(
        name = "catalog.repository.get_products",
        skip(self, tx, products),
        fields(requested = products.len(), found = tracing::field::Empty),
        err
    )]
    pub(crate) async fn get_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        products: &[ProductUuid],
    ) -> Result<Vec<Product>, sqlx::Error> {
        let uuids: Vec<Uuid> = products.iter().map(|product| product.into_uuid()).collect();

        let records: Vec<ProductRecord> = query_as(GET_PRODUCTS_SQL)
            .bind(&uuids)
            .fetch_all(&mut **tx)
            .await?;

        let categories: Vec<CategoryRecord> = query_as(LIST_PRODUCT_CATEGORIES_SQL)
            .bind(&uuids)
            .fetch_all(&mut **tx)
            .await?;

        let attributes: Vec<AttributeRecord> = query_as(LIST_PRODUCT_ATTRIBUTES_SQL)
            .bind(&uuids)
            .fetch_all(&mut **tx)
            .await?;

        let mut by_uuid: FxHashMap<ProductUuid, Product> = records
            .into_iter()
            .map(|ProductRecord(product)| (product.uuid, product))
            .collect();

        for record in categories {
            if let Some(product) = by_uuid.get_mut(&record.product) {
                product.categories.push(record.category);
            }
        }

        for AttributeRecord(attribute) in attributes {
            if let Some(product) = by_uuid.get_mut(&attribute.product) {
                product.attributes.push(attribute);
            }
        }

        let found: Vec<Product> = products
            .iter()
            .filter_map(|uuid| by_uuid.remove(uuid))
            .collect();

        tracing::Span::current().record("found", found.len());

        Ok(found)
    }

    pub(crate) async fn find_attributes(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        attributes: &[AttributeUuid],
    ) -> Result<Vec<Attribute>, sqlx::Error> {
        let uuids: Vec<Uuid> = attributes
            .iter()
            .map(|attribute| attribute.into_uuid())
            .collect();

        let records: Vec<AttributeRecord> = query_as(FIND_ATTRIBUTES_SQL)
            .bind(&uuids)
            .fetch_all(&mut **tx)
            .await?;

        Ok(records
            .into_iter()
            .map(|AttributeRecord(attribute)| attribute)
            .collect())
    }

    pub(crate) async fn increment_sold_counts(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        sold: &[SoldUnits],
    ) -> Result<u64, sqlx::Error> {
        update_sold_counts(tx, INCREMENT_SOLD_COUNTS_SQL, sold).await
    }

    pub(crate) async fn decrement_sold_counts(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        sold: &[SoldUnits],
    ) -> Result<u64, sqlx::Error> {
        update_sold_counts(tx, DECREMENT_SOLD_COUNTS_SQL, sold).await
    }
}

async fn update_sold_counts(
    tx: &mut Transaction<'_, Postgres>,
    sql: &'static str,
    sold: &[SoldUnits],
) -> Result<u64, sqlx::Error> {
    let products: Vec<Uuid> = sold.iter().map(|units| units.product.into_uuid()).collect();
    let quantities: Vec<i64> = sold.iter().map(|units| units.quantity).collect();

    let rows_affected = query(sql)
        .bind(&products)
        .bind(&quantities)
        .execute(&mut **tx)
        .await?
        .rows_affected();

    debug!(rows_affected, "updated sold counts");

    Ok(rows_affected)
}
