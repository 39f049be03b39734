//! Catalog Models

use martina::catalog::ProductUuid;

/// Units sold of a product, applied to its sold counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoldUnits {
    pub product: ProductUuid,
    pub quantity: i64,
}
