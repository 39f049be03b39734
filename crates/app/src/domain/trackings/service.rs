//! Trackings service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        orders::models::OrderUuid,
        trackings::{
            errors::TrackingsServiceError,
            models::{NewTracking, Tracking},
            repository::PgTrackingsRepository,
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgTrackingsService {
    db: Db,
    repository: PgTrackingsRepository,
}

impl PgTrackingsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgTrackingsRepository::new(),
        }
    }
}

#[async_trait]
impl TrackingsService for PgTrackingsService {
    #[tracing::instrument(
        name = "trackings.service.create_tracking",
        skip(self, tracking),
        fields(order_uuid = %tracking.order, method = %tracking.method),
        err
    )]
    async fn create_tracking(
        &self,
        tracking: NewTracking,
    ) -> Result<Tracking, TrackingsServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self.repository.create_tracking(&mut tx, &tracking).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn list_order_trackings(
        &self,
        order: OrderUuid,
    ) -> Result<Vec<Tracking>, TrackingsServiceError> {
        let mut tx = self.db.begin().await?;

        let trackings = self.repository.list_order_trackings(&mut tx, order).await?;

        tx.commit().await?;

        Ok(trackings)
    }
}

#[automock]
#[async_trait]
pub trait TrackingsService: Send + Sync {
    /// Opens shipment tracking for an order.
    async fn create_tracking(&self, tracking: NewTracking)
    -> Result<Tracking, TrackingsServiceError>;

    async fn list_order_trackings(
        &self,
        order: OrderUuid,
    ) -> Result<Vec<Tracking>, TrackingsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::{
            orders::OrdersService as _,
            trackings::models::{ORDER_RECEIVED, TrackingMethod},
        },
        test::{TestContext, helpers},
    };

    use super::*;

    #[tokio::test]
    #[ignore = "requires a Docker daemon for the Postgres test container"]
    async fn new_trackings_start_as_received() -> TestResult {
        let ctx = TestContext::new().await;
        let order = helpers::create_order(&ctx).await?;

        let tracking = NewTracking::received(order.uuid, order.created_at)?;
        let created = ctx.trackings.create_tracking(tracking.clone()).await?;

        assert_eq!(created.method, TrackingMethod::Standard);
        assert_eq!(created.shipping_date, tracking.shipping_date);
        assert_eq!(created.event, ORDER_RECEIVED);
        assert_eq!(created.status, ORDER_RECEIVED);

        assert_eq!(
            ctx.trackings.list_order_trackings(order.uuid).await?,
            vec![created]
        );

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for the Postgres test container"]
    async fn trackings_go_with_their_order() -> TestResult {
        let ctx = TestContext::new().await;
        let order = helpers::create_order(&ctx).await?;

        ctx.trackings
            .create_tracking(NewTracking::received(order.uuid, order.created_at)?)
            .await?;

        ctx.orders.delete_order(order.uuid).await?;

        assert!(ctx.trackings.list_order_trackings(order.uuid).await?.is_empty());

        Ok(())
    }
}
