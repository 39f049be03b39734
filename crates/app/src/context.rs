//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    database::{self, Db},
    domain::{
        catalog::{CatalogService, PgCatalogService},
        discounts::{DiscountsService, PgDiscountsService},
        inventory::{InventoryService, PgInventoryService},
        orders::{OrdersService, PgOrdersService},
        payments::{
            PaymentGateway, PaymentGatewayError, PaymentsService, PaypalConfig, PaypalGateway,
            PgPaymentsService,
        },
        placement::{Orchestrator, PlacementService},
        trackings::{PgTrackingsService, TrackingsService},
        users::{PgUsersService, UsersService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply database migrations")]
    Migrations(#[source] sqlx::migrate::MigrateError),

    #[error("failed to build payment gateway client")]
    Gateway(#[source] PaymentGatewayError),
}

#[derive(Clone)]
pub struct AppContext {
    pub users: Arc<dyn UsersService>,
    pub placement: Arc<dyn PlacementService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// Pending migrations are applied before any service is handed out.
    ///
    /// # Errors
    ///
    /// Returns an error when connecting, migrating or building the PayPal
    /// client fails.
    pub async fn from_database_url(url: &str, paypal: PaypalConfig) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        database::migrate(&pool)
            .await
            .map_err(AppInitError::Migrations)?;

        let gateway = PaypalGateway::new(paypal).map_err(AppInitError::Gateway)?;

        Ok(Self::from_parts(Db::new(pool), Arc::new(gateway)))
    }

    /// Wire every service onto one database handle.
    #[must_use]
    pub fn from_parts(db: Db, gateway: Arc<dyn PaymentGateway>) -> Self {
        let users: Arc<dyn UsersService> = Arc::new(PgUsersService::new(db.clone()));
        let catalog: Arc<dyn CatalogService> = Arc::new(PgCatalogService::new(db.clone()));
        let discounts: Arc<dyn DiscountsService> = Arc::new(PgDiscountsService::new(db.clone()));
        let inventory: Arc<dyn InventoryService> = Arc::new(PgInventoryService::new(db.clone()));
        let orders: Arc<dyn OrdersService> = Arc::new(PgOrdersService::new(db.clone()));
        let payments: Arc<dyn PaymentsService> = Arc::new(PgPaymentsService::new(db.clone()));
        let trackings: Arc<dyn TrackingsService> = Arc::new(PgTrackingsService::new(db));

        let placement = Orchestrator::new(
            users.clone(),
            catalog,
            discounts,
            inventory,
            orders,
            payments,
            trackings,
            gateway,
        );

        Self {
            users,
            placement: Arc::new(placement),
        }
    }
}
