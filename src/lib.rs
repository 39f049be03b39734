//! Martina
//!
//! Martina prices and assembles multi-vendor orders: it resolves the discounts
//! that apply to each line, prices lines with attribute surcharges and
//! shipping, plans inventory decrements and freezes the result into order
//! snapshots. Everything here is pure; persistence lives in `martina-app`.

pub mod catalog;
pub mod discounts;
pub mod inventory;
pub mod orders;
pub mod pricing;
pub mod uuids;
