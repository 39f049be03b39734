//! Trackings

pub mod errors;
pub mod models;
mod repository;
pub mod service;

pub use errors::TrackingsServiceError;
pub use service::*;
