//! Catalog

pub mod errors;
pub mod models;
mod records;
mod repository;
pub mod service;

pub use errors::CatalogServiceError;
pub use service::*;
