//! Trackings Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::domain::{
    orders::models::OrderUuid,
    trackings::models::{NewTracking, Tracking, TrackingMethod, TrackingUuid},
};

const CREATE_TRACKING_SQL: &str = include_str!("sql/create_tracking.sql");
const LIST_ORDER_TRACKINGS_SQL: &str = include_str!("sql/list_order_trackings.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgTrackingsRepository;

impl PgTrackingsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_tracking(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tracking: &NewTracking,
    ) -> Result<Tracking, sqlx::Error> {
        query_as::<Postgres, Tracking>(CREATE_TRACKING_SQL)
            .bind(tracking.uuid.into_uuid())
            .bind(tracking.order.into_uuid())
            .bind(tracking.method.as_str())
            .bind(SqlxTimestamp::from(tracking.shipping_date))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_order_trackings(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Vec<Tracking>, sqlx::Error> {
        query_as::<Postgres, Tracking>(LIST_ORDER_TRACKINGS_SQL)
            .bind(order.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for Tracking {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let method: String = row.try_get("method")?;

        let method = method
            .parse::<TrackingMethod>()
            .map_err(|error| sqlx::Error::ColumnDecode {
                index: "method".to_string(),
                source: Box::new(error),
            })?;

        Ok(Self {
            uuid: TrackingUuid::from_uuid(row.try_get("uuid")?),
            order: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            method,
            shipping_date: row.try_get::<SqlxTimestamp, _>("shipping_date")?.to_jiff(),
            event: row.try_get("event")?,
            status: row.try_get("status")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
