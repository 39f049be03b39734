//! Payments Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction as SqlxTransaction, postgres::PgRow, query_as};

use crate::domain::{
    orders::models::OrderUuid,
    payments::models::{
        NewTransaction, PaymentMethod, Transaction, TransactionStatus, TransactionUuid,
    },
};

const CREATE_TRANSACTION_SQL: &str = include_str!("sql/create_transaction.sql");
const LIST_ORDER_TRANSACTIONS_SQL: &str = include_str!("sql/list_order_transactions.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgPaymentsRepository;

impl PgPaymentsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_transaction(
        &self,
        tx: &mut SqlxTransaction<'_, Postgres>,
        transaction: &NewTransaction,
    ) -> Result<Transaction, sqlx::Error> {
        query_as::<Postgres, Transaction>(CREATE_TRANSACTION_SQL)
            .bind(transaction.uuid.into_uuid())
            .bind(transaction.order.into_uuid())
            .bind(transaction.method.as_str())
            .bind(transaction.external_id.as_deref())
            .bind(transaction.amount)
            .bind(transaction.status.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_order_transactions(
        &self,
        tx: &mut SqlxTransaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        query_as::<Postgres, Transaction>(LIST_ORDER_TRANSACTIONS_SQL)
            .bind(order.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for Transaction {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let method: String = row.try_get("method")?;
        let status: String = row.try_get("status")?;

        let method = method
            .parse::<PaymentMethod>()
            .map_err(|error| sqlx::Error::ColumnDecode {
                index: "method".to_string(),
                source: Box::new(error),
            })?;

        let status = status
            .parse::<TransactionStatus>()
            .map_err(|error| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(error),
            })?;

        Ok(Self {
            uuid: TransactionUuid::from_uuid(row.try_get("uuid")?),
            order: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            method,
            external_id: row.try_get("external_id")?,
            amount: row.try_get("amount")?,
            status,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
