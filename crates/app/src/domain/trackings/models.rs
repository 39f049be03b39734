//! Tracking Models

use std::{fmt, str::FromStr};

use jiff::{SignedDuration, Timestamp};
use martina::uuids::TypedUuid;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::orders::models::OrderUuid;

/// Tracking UUID
pub type TrackingUuid = TypedUuid<Tracking>;

/// Event and status every tracking starts with.
pub const ORDER_RECEIVED: &str = "ORDER RECEIVED";

/// Time between placement and the planned shipping date.
pub const SHIPPING_LEAD_TIME: SignedDuration = SignedDuration::from_hours(3 * 24);

/// Delivery speed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackingMethod {
    #[default]
    #[serde(rename = "STANDARD")]
    Standard,

    #[serde(rename = "EXPRESS")]
    Express,

    #[serde(rename = "SAME DAY")]
    SameDay,
}

impl TrackingMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "STANDARD",
            Self::Express => "EXPRESS",
            Self::SameDay => "SAME DAY",
        }
    }
}

impl fmt::Display for TrackingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown tracking method: {0}")]
pub struct UnknownTrackingMethod(pub String);

impl FromStr for TrackingMethod {
    type Err = UnknownTrackingMethod;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "STANDARD" => Ok(Self::Standard),
            "EXPRESS" => Ok(Self::Express),
            "SAME DAY" => Ok(Self::SameDay),
            other => Err(UnknownTrackingMethod(other.to_string())),
        }
    }
}

/// Tracking Model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tracking {
    pub uuid: TrackingUuid,
    pub order: OrderUuid,
    pub method: TrackingMethod,
    pub shipping_date: Timestamp,
    pub event: String,
    pub status: String,
    pub created_at: Timestamp,
}

/// New Tracking Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTracking {
    pub uuid: TrackingUuid,
    pub order: OrderUuid,
    pub method: TrackingMethod,
    pub shipping_date: Timestamp,
}

impl NewTracking {
    /// Standard tracking for an order placed at `placed_at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the shipping date falls outside the supported range.
    pub fn received(order: OrderUuid, placed_at: Timestamp) -> Result<Self, jiff::Error> {
        Ok(Self {
            uuid: TrackingUuid::new(),
            order,
            method: TrackingMethod::default(),
            shipping_date: placed_at.checked_add(SHIPPING_LEAD_TIME)?,
        })
    }
}
