//! Martina Domain Concerns

pub mod catalog;
pub mod discounts;
pub mod inventory;
pub mod orders;
pub mod payments;
pub mod placement;
pub mod trackings;
pub mod users;
