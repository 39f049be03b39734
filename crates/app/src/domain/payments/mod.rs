//! Payments

pub mod errors;
pub mod gateway;
pub mod models;
mod repository;
pub mod service;

pub use errors::PaymentsServiceError;
pub use gateway::{
    CapturedPayment, ExternalPaymentOrder, MockPaymentGateway, PaymentGateway,
    PaymentGatewayError, PaypalConfig, PaypalGateway,
};
pub use service::*;
