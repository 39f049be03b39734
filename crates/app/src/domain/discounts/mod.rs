//! Discounts

pub mod errors;
mod records;
mod repository;
pub mod service;

pub use errors::DiscountsServiceError;
pub use service::*;
