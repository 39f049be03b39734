//! Order Models

use jiff::Timestamp;
use martina::{
    catalog::VendorUuid,
    orders::{AssembledOrder, OrderLine, OrderStatus, OrderTotals},
    uuids::TypedUuid,
};
use serde::{Deserialize, Serialize};

use crate::domain::users::models::{AddressUuid, UserUuid};

/// Order UUID
pub type OrderUuid = TypedUuid<Order>;

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub uuid: OrderUuid,
    pub customer: UserUuid,
    pub address: AddressUuid,

    /// Distinct vendors, in first-seen order
    pub vendors: Vec<VendorUuid>,

    pub lines: Vec<OrderLine>,

    #[serde(flatten)]
    pub totals: OrderTotals,

    pub status: OrderStatus,
    pub created_at: Timestamp,
}

/// Order to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub uuid: OrderUuid,
    pub customer: UserUuid,
    pub address: AddressUuid,
    pub vendors: Vec<VendorUuid>,
    pub lines: Vec<OrderLine>,
    pub totals: OrderTotals,
}

impl NewOrder {
    /// Builds a pending order for `customer` out of an assembled order.
    #[must_use]
    pub fn from_assembled(
        customer: UserUuid,
        address: AddressUuid,
        assembled: AssembledOrder,
    ) -> Self {
        Self {
            uuid: OrderUuid::new(),
            customer,
            address,
            vendors: assembled.vendors,
            lines: assembled.lines,
            totals: assembled.totals,
        }
    }
}
