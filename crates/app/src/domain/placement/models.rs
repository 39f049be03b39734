//! Placement Models

use std::fmt;

use martina::catalog::{AttributeUuid, ProductUuid};
use serde::{Deserialize, Serialize};

use crate::domain::{
    orders::models::Order,
    payments::models::{PaymentMethod, Transaction},
    trackings::models::Tracking,
    users::models::AddressUuid,
};

/// Progress of a placement through its steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlacementState {
    Received,
    Validated,
    Priced,
    StockReserved,
    Persisted,
    SideEffectsApplied,

    /// Turned down before anything was committed.
    Rejected,

    /// Failed after committing, compensations have run.
    Failed,
}

impl PlacementState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Received => "RECEIVED",
            Self::Validated => "VALIDATED",
            Self::Priced => "PRICED",
            Self::StockReserved => "STOCK_RESERVED",
            Self::Persisted => "PERSISTED",
            Self::SideEffectsApplied => "SIDE_EFFECTS_APPLIED",
            Self::Rejected => "REJECTED",
            Self::Failed => "FAILED",
        }
    }

    /// Whether stock or order rows may have been written by this point.
    #[must_use]
    pub const fn has_committed(self) -> bool {
        matches!(
            self,
            Self::StockReserved | Self::Persisted | Self::SideEffectsApplied
        )
    }
}

impl fmt::Display for PlacementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A requested product line. Quantities are checked, not trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftLine {
    pub product_id: ProductUuid,
    pub quantity: i64,
}

/// What a customer wants to buy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    #[serde(default)]
    pub products: Vec<DraftLine>,

    /// Attributes picked across all lines
    #[serde(default)]
    pub attributes: Vec<AttributeUuid>,

    /// Coupon codes, case-sensitive
    #[serde(default)]
    pub coupons: Vec<String>,
}

/// Payment details supplied with a placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub method: PaymentMethod,

    /// PayPal capture id, required for PayPal payments
    #[serde(default)]
    pub transaction_id: Option<String>,
}

/// Order placement request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRequest {
    #[serde(flatten)]
    pub draft: OrderDraft,

    #[serde(default)]
    pub address: Option<AddressUuid>,

    pub payment: PaymentDetails,
}

/// Request to open an external payment for a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalPaymentRequest {
    #[serde(flatten)]
    pub draft: OrderDraft,

    #[serde(default)]
    pub address: Option<AddressUuid>,
}

/// A completed placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementOutcome {
    pub order: Order,
    pub transaction: Transaction,
    pub tracking: Tracking,
    pub state: PlacementState,
}
