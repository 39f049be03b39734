//! Inventory
//!
//! Stock is held in batches. Only batches flagged current are sellable, and a
//! product without any current batch is treated as having unlimited stock.

use jiff::Timestamp;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{catalog::ProductUuid, uuids::TypedUuid};

/// Inventory Batch UUID
pub type BatchUuid = TypedUuid<InventoryBatch>;

/// Errors raised by availability checks.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StockError {
    /// The current batches of a product hold less than requested.
    #[error("insufficient stock for product {product}: requested {requested}, available {available}")]
    Insufficient {
        /// Product short of stock
        product: ProductUuid,

        /// Units requested
        requested: u32,

        /// Units held across current batches
        available: i64,
    },
}

/// A batch of stock for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryBatch {
    /// Batch id
    pub uuid: BatchUuid,

    /// Stocked product
    pub product: ProductUuid,

    /// Units left in the batch
    pub quantity: i64,

    /// Whether the batch is eligible for sale
    pub is_current: bool,

    /// Creation time, older batches are drawn first
    pub created_at: Timestamp,
}

/// Units requested for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockRequest {
    /// Requested product
    pub product: ProductUuid,

    /// Units requested, at least one
    pub quantity: u32,
}

/// Units to take out of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockDecrement {
    /// Batch to draw from
    pub batch: BatchUuid,

    /// Product held by the batch
    pub product: ProductUuid,

    /// Units to remove
    pub quantity: i64,
}

/// Whether any requested product is stock-tracked at all.
pub fn any_tracked(requests: &[StockRequest], batches: &[InventoryBatch]) -> bool {
    requests.iter().any(|request| {
        batches
            .iter()
            .any(|batch| batch.is_current && batch.product == request.product)
    })
}

/// Checks that every stock-tracked product holds enough units.
///
/// # Errors
///
/// Returns [`StockError::Insufficient`] for the first product whose current
/// batches sum to less than requested.
pub fn check_availability(
    requests: &[StockRequest],
    batches: &[InventoryBatch],
) -> Result<(), StockError> {
    let available = current_stock(batches);

    for request in requests {
        let Some(&held) = available.get(&request.product) else {
            continue;
        };

        if held < i64::from(request.quantity) {
            return Err(StockError::Insufficient {
                product: request.product,
                requested: request.quantity,
                available: held,
            });
        }
    }

    Ok(())
}

/// Plans the batch decrements for a set of requests.
///
/// Each request is drawn from its product's current batches oldest first.
/// Products without current batches produce no decrements.
///
/// # Errors
///
/// Returns [`StockError::Insufficient`] when a product cannot be covered.
pub fn plan_decrements(
    requests: &[StockRequest],
    batches: &[InventoryBatch],
) -> Result<Vec<StockDecrement>, StockError> {
    check_availability(requests, batches)?;

    let mut by_product: FxHashMap<ProductUuid, SmallVec<[&InventoryBatch; 2]>> =
        FxHashMap::default();

    for batch in batches.iter().filter(|batch| batch.is_current) {
        by_product.entry(batch.product).or_default().push(batch);
    }

    for product_batches in by_product.values_mut() {
        product_batches.sort_by_key(|batch| (batch.created_at, batch.uuid));
    }

    let mut decrements = Vec::new();

    for request in requests {
        let Some(product_batches) = by_product.get(&request.product) else {
            continue;
        };

        let mut outstanding = i64::from(request.quantity);

        for batch in product_batches {
            if outstanding == 0 {
                break;
            }

            let take = outstanding.min(batch.quantity);

            if take > 0 {
                decrements.push(StockDecrement {
                    batch: batch.uuid,
                    product: batch.product,
                    quantity: take,
                });

                outstanding -= take;
            }
        }
    }

    Ok(decrements)
}

fn current_stock(batches: &[InventoryBatch]) -> FxHashMap<ProductUuid, i64> {
    let mut available: FxHashMap<ProductUuid, i64> = FxHashMap::default();

    for batch in batches.iter().filter(|batch| batch.is_current) {
        let held = available.entry(batch.product).or_default();
        *held = held.saturating_add(batch.quantity.max(0));
    }

    available
}
