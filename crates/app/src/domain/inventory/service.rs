//! Inventory service.

use async_trait::async_trait;
use martina::{
    catalog::ProductUuid,
    inventory::{InventoryBatch, StockRequest, plan_decrements},
};
use mockall::automock;
use tracing::{debug, info};

use crate::{
    database::Db,
    domain::inventory::{
        errors::InventoryServiceError, models::StockReservation,
        repository::PgInventoryRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgInventoryService {
    db: Db,
    repository: PgInventoryRepository,
}

impl PgInventoryService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgInventoryRepository::new(),
        }
    }
}

#[async_trait]
impl InventoryService for PgInventoryService {
    async fn current_batches(
        &self,
        products: &[ProductUuid],
    ) -> Result<Vec<InventoryBatch>, InventoryServiceError> {
        let mut tx = self.db.begin().await?;

        let batches = self
            .repository
            .list_current_batches(&mut tx, products)
            .await?;

        tx.commit().await?;

        Ok(batches)
    }

    #[tracing::instrument(
        name = "inventory.service.reserve",
        skip(self, requests),
        fields(
            request_count = requests.len(),
            decrement_count = tracing::field::Empty
        ),
        err
    )]
    async fn reserve(
        &self,
        requests: &[StockRequest],
    ) -> Result<StockReservation, InventoryServiceError> {
        let products: Vec<ProductUuid> = requests.iter().map(|request| request.product).collect();

        let mut tx = self.db.begin().await?;

        let batches = self
            .repository
            .lock_current_batches(&mut tx, &products)
            .await?;

        let decrements = plan_decrements(requests, &batches)?;

        tracing::Span::current().record("decrement_count", decrements.len());

        for decrement in &decrements {
            let rows_affected = self.repository.decrement_batch(&mut tx, decrement).await?;

            if rows_affected == 0 {
                return Err(InventoryServiceError::StockChanged(decrement.batch));
            }

            debug!(
                batch_uuid = %decrement.batch,
                product_uuid = %decrement.product,
                quantity = decrement.quantity,
                "decremented inventory batch"
            );
        }

        tx.commit().await?;

        info!(decrement_count = decrements.len(), "reserved stock");

        Ok(StockReservation { decrements })
    }

    #[tracing::instrument(
        name = "inventory.service.restore",
        skip(self, reservation),
        fields(decrement_count = reservation.decrements.len()),
        err
    )]
    async fn restore(&self, reservation: &StockReservation) -> Result<(), InventoryServiceError> {
        let mut tx = self.db.begin().await?;

        for decrement in &reservation.decrements {
            let rows_affected = self.repository.restore_batch(&mut tx, decrement).await?;

            if rows_affected == 0 {
                return Err(InventoryServiceError::NotFound);
            }
        }

        tx.commit().await?;

        info!(
            decrement_count = reservation.decrements.len(),
            "restored reserved stock"
        );

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait InventoryService: Send + Sync {
    /// Returns the current batches of `products`, oldest first.
    async fn current_batches(
        &self,
        products: &[ProductUuid],
    ) -> Result<Vec<InventoryBatch>, InventoryServiceError>;

    /// Checks and decrements stock in one transaction.
    ///
    /// Nothing is decremented unless every request can be covered.
    async fn reserve(
        &self,
        requests: &[StockRequest],
    ) -> Result<StockReservation, InventoryServiceError>;

    /// Adds the quantities of a reservation back to their batches.
    async fn restore(&self, reservation: &StockReservation) -> Result<(), InventoryServiceError>;
}
