//! Order Placement
//!
//! Validates, prices, reserves stock for and persists customer orders, undoing
//! the steps already taken when a later one fails.

pub mod errors;
pub mod models;
mod orchestrator;
mod saga;
pub mod service;

pub use errors::PlacementError;
pub use orchestrator::Orchestrator;
pub use service::*;
