//! Payment Handlers

pub(crate) mod capture;
pub(crate) mod create;
