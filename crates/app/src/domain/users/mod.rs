//! Users

pub mod errors;
pub mod models;
mod repository;
pub mod service;
pub mod token;

pub use errors::UsersServiceError;
pub use service::*;
