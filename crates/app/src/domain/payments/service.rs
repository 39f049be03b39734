//! Payments service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        orders::models::OrderUuid,
        payments::{
            errors::PaymentsServiceError,
            models::{NewTransaction, Transaction},
            repository::PgPaymentsRepository,
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgPaymentsService {
    db: Db,
    repository: PgPaymentsRepository,
}

impl PgPaymentsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgPaymentsRepository::new(),
        }
    }
}

#[async_trait]
impl PaymentsService for PgPaymentsService {
    #[tracing::instrument(
        name = "payments.service.create_transaction",
        skip(self, transaction),
        fields(
            order_uuid = %transaction.order,
            method = %transaction.method,
            status = %transaction.status
        ),
        err
    )]
    async fn create_transaction(
        &self,
        transaction: NewTransaction,
    ) -> Result<Transaction, PaymentsServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self
            .repository
            .create_transaction(&mut tx, &transaction)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn list_order_transactions(
        &self,
        order: OrderUuid,
    ) -> Result<Vec<Transaction>, PaymentsServiceError> {
        let mut tx = self.db.begin().await?;

        let transactions = self
            .repository
            .list_order_transactions(&mut tx, order)
            .await?;

        tx.commit().await?;

        Ok(transactions)
    }
}

#[automock]
#[async_trait]
pub trait PaymentsService: Send + Sync {
    /// Records a payment transaction against an order.
    async fn create_transaction(
        &self,
        transaction: NewTransaction,
    ) -> Result<Transaction, PaymentsServiceError>;

    async fn list_order_transactions(
        &self,
        order: OrderUuid,
    ) -> Result<Vec<Transaction>, PaymentsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::payments::models::{PaymentMethod, TransactionStatus, TransactionUuid},
        test::{TestContext, helpers},
    };

    use super::*;

    #[tokio::test]
    #[ignore = "requires a Docker daemon for the Postgres test container"]
    async fn paypal_transactions_keep_their_external_id() -> TestResult {
        let ctx = TestContext::new().await;
        let order = helpers::create_order(&ctx).await?;

        let created = ctx
            .payments
            .create_transaction(NewTransaction {
                uuid: TransactionUuid::new(),
                order: order.uuid,
                method: PaymentMethod::Paypal,
                external_id: Some("8MC585209K746392H".to_string()),
                amount: order.totals.total,
                status: TransactionStatus::Captured,
            })
            .await?;

        let listed = ctx.payments.list_order_transactions(order.uuid).await?;

        assert_eq!(listed, vec![created]);
        assert_eq!(listed[0].external_id.as_deref(), Some("8MC585209K746392H"));

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for the Postgres test container"]
    async fn paypal_transactions_require_an_external_id() -> TestResult {
        let ctx = TestContext::new().await;
        let order = helpers::create_order(&ctx).await?;

        let result = ctx
            .payments
            .create_transaction(NewTransaction {
                uuid: TransactionUuid::new(),
                order: order.uuid,
                method: PaymentMethod::Paypal,
                external_id: None,
                amount: order.totals.total,
                status: TransactionStatus::Captured,
            })
            .await;

        assert!(
            matches!(result, Err(PaymentsServiceError::InvalidData)),
            "expected InvalidData, got {result:?}"
        );

        Ok(())
    }
}
