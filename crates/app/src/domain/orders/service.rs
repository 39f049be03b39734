//! Orders service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        orders::{
            errors::OrdersServiceError,
            models::{NewOrder, Order, OrderUuid},
            repository::PgOrdersRepository,
        },
        users::models::UserUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgOrdersService {
    db: Db,
    repository: PgOrdersRepository,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgOrdersRepository::new(),
        }
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    #[tracing::instrument(
        name = "orders.service.create_order",
        skip(self, order),
        fields(
            order_uuid = %order.uuid,
            customer_uuid = %order.customer,
            line_count = order.lines.len(),
            total = order.totals.total
        ),
        err
    )]
    async fn create_order(&self, order: NewOrder) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self.repository.create_order(&mut tx, &order).await?;

        tx.commit().await?;

        info!(vendor_count = created.vendors.len(), "created order");

        Ok(created)
    }

    #[tracing::instrument(
        name = "orders.service.delete_order",
        skip(self),
        fields(order_uuid = %order),
        err
    )]
    async fn delete_order(&self, order: OrderUuid) -> Result<(), OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.repository.delete_order(&mut tx, order).await?;

        if rows_affected == 0 {
            return Err(OrdersServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    async fn get_order(&self, order: OrderUuid) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let order = self.repository.get_order(&mut tx, order).await?;

        tx.commit().await?;

        Ok(order)
    }

    async fn list_customer_orders(
        &self,
        customer: UserUuid,
    ) -> Result<Vec<Order>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let orders = self
            .repository
            .list_customer_orders(&mut tx, customer)
            .await?;

        tx.commit().await?;

        Ok(orders)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Persists an order in `PENDING APPROVAL`.
    async fn create_order(&self, order: NewOrder) -> Result<Order, OrdersServiceError>;

    /// Removes an order along with its transactions and trackings.
    async fn delete_order(&self, order: OrderUuid) -> Result<(), OrdersServiceError>;

    async fn get_order(&self, order: OrderUuid) -> Result<Order, OrdersServiceError>;

    /// Lists a customer's orders, newest first.
    async fn list_customer_orders(
        &self,
        customer: UserUuid,
    ) -> Result<Vec<Order>, OrdersServiceError>;
}
