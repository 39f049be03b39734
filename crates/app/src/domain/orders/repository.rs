//! Orders Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use martina::{
    catalog::VendorUuid,
    orders::{OrderLine, OrderStatus, OrderTotals},
};
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, types::Json};
use uuid::Uuid;

use crate::domain::{
    orders::models::{NewOrder, Order, OrderUuid},
    users::models::{AddressUuid, UserUuid},
};

const CREATE_ORDER_SQL: &str = include_str!("sql/create_order.sql");
const GET_ORDER_SQL: &str = include_str!("sql/get_order.sql");
const LIST_CUSTOMER_ORDERS_SQL: &str = include_str!("sql/list_customer_orders.sql");
const DELETE_ORDER_SQL: &str = include_str!("sql/delete_order.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &NewOrder,
    ) -> Result<Order, sqlx::Error> {
        let vendors: Vec<Uuid> = order
            .vendors
            .iter()
            .map(|vendor| vendor.into_uuid())
            .collect();

        query_as::<Postgres, Order>(CREATE_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(order.customer.into_uuid())
            .bind(order.address.into_uuid())
            .bind(&vendors)
            .bind(Json(&order.lines))
            .bind(order.totals.subtotal)
            .bind(order.totals.shipping_cost)
            .bind(order.totals.discount)
            .bind(order.totals.total)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Order, sqlx::Error> {
        query_as::<Postgres, Order>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_customer_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: UserUuid,
    ) -> Result<Vec<Order>, sqlx::Error> {
        query_as::<Postgres, Order>(LIST_CUSTOMER_ORDERS_SQL)
            .bind(customer.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn delete_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_ORDER_SQL)
            .bind(order.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for Order {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;

        let status = OrderStatus::parse(&status).map_err(|error| sqlx::Error::ColumnDecode {
            index: "status".to_string(),
            source: Box::new(error),
        })?;

        let vendors: Vec<Uuid> = row.try_get("vendor_uuids")?;
        let Json(lines): Json<Vec<OrderLine>> = row.try_get("lines")?;

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            customer: UserUuid::from_uuid(row.try_get("customer_uuid")?),
            address: AddressUuid::from_uuid(row.try_get("address_uuid")?),
            vendors: vendors.into_iter().map(VendorUuid::from_uuid).collect(),
            lines,
            totals: OrderTotals {
                subtotal: row.try_get("subtotal")?,
                shipping_cost: row.try_get("shipping_cost")?,
                discount: row.try_get("discount")?,
                total: row.try_get("total")?,
            },
            status,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
