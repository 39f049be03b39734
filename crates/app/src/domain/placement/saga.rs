//! Compensations for partially applied placements.

use martina::discounts::DiscountUuid;
use tracing::{error, info};

use crate::domain::{
    catalog::models::SoldUnits, inventory::models::StockReservation,
    orders::models::OrderUuid,
};

use super::orchestrator::Orchestrator;

/// A committed step and how to undo it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Compensation {
    RestoreStock(StockReservation),
    DeleteOrder(OrderUuid),
    DecrementSoldCounts(Vec<SoldUnits>),
    ReleaseCoupons(Vec<DiscountUuid>),
}

impl Compensation {
    fn name(&self) -> &'static str {
        match self {
            Self::RestoreStock(_) => "restore_stock",
            Self::DeleteOrder(_) => "delete_order",
            Self::DecrementSoldCounts(_) => "decrement_sold_counts",
            Self::ReleaseCoupons(_) => "release_coupons",
        }
    }
}

/// Compensations registered so far, undone last-in first-out.
#[derive(Debug, Default)]
pub(crate) struct Saga {
    steps: Vec<Compensation>,
}

impl Saga {
    pub(crate) fn register(&mut self, compensation: Compensation) {
        self.steps.push(compensation);
    }

    /// Runs every compensation in reverse order of registration.
    ///
    /// A failing compensation is logged and does not stop the rest.
    pub(crate) async fn compensate(self, orchestrator: &Orchestrator) {
        for compensation in self.steps.into_iter().rev() {
            let name = compensation.name();

            let result = match compensation {
                Compensation::RestoreStock(reservation) => orchestrator
                    .inventory
                    .restore(&reservation)
                    .await
                    .map_err(|error| error.to_string()),
                Compensation::DeleteOrder(order) => orchestrator
                    .orders
                    .delete_order(order)
                    .await
                    .map_err(|error| error.to_string()),
                Compensation::DecrementSoldCounts(sold) => orchestrator
                    .catalog
                    .decrement_sold_counts(&sold)
                    .await
                    .map_err(|error| error.to_string()),
                Compensation::ReleaseCoupons(discounts) => orchestrator
                    .discounts
                    .release_coupons(&discounts)
                    .await
                    .map_err(|error| error.to_string()),
            };

            match result {
                Ok(()) => info!(compensation = name, "compensation applied"),
                Err(error) => error!(compensation = name, %error, "compensation failed"),
            }
        }
    }
}
