//! Inventory Models

use martina::inventory::StockDecrement;

/// Decrements applied by a successful reservation, kept to restore them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockReservation {
    pub decrements: Vec<StockDecrement>,
}

impl StockReservation {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decrements.is_empty()
    }
}
