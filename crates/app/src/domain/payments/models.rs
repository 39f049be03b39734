//! Payment Models

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use martina::uuids::TypedUuid;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::orders::models::OrderUuid;

/// Transaction UUID
pub type TransactionUuid = TypedUuid<Transaction>;

/// How an order is paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "CASH_ON_DELIVERY")]
    CashOnDelivery,

    #[serde(rename = "PAYPAL")]
    Paypal,
}

impl PaymentMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CashOnDelivery => "CASH_ON_DELIVERY",
            Self::Paypal => "PAYPAL",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown payment method: {0}")]
pub struct UnknownPaymentMethod(pub String);

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "CASH_ON_DELIVERY" => Ok(Self::CashOnDelivery),
            "PAYPAL" => Ok(Self::Paypal),
            other => Err(UnknownPaymentMethod(other.to_string())),
        }
    }
}

/// Lifecycle status of a payment transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Authorized,
    Captured,
    Processing,
    Failed,
    Declined,
    Refunded,
    #[serde(rename = "PARTIALLY REFUNDED")]
    PartiallyRefunded,
    #[serde(rename = "CHARGEBACK INITIATED")]
    ChargebackInitiated,
    #[serde(rename = "CHARGEBACK WON")]
    ChargebackWon,
    #[serde(rename = "CHARGEBACK LOST")]
    ChargebackLost,
    Cancelled,
    Reversed,
    Settled,
    #[serde(rename = "PARTIALLY SETTLED")]
    PartiallySettled,
}

impl TransactionStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Authorized => "AUTHORIZED",
            Self::Captured => "CAPTURED",
            Self::Processing => "PROCESSING",
            Self::Failed => "FAILED",
            Self::Declined => "DECLINED",
            Self::Refunded => "REFUNDED",
            Self::PartiallyRefunded => "PARTIALLY REFUNDED",
            Self::ChargebackInitiated => "CHARGEBACK INITIATED",
            Self::ChargebackWon => "CHARGEBACK WON",
            Self::ChargebackLost => "CHARGEBACK LOST",
            Self::Cancelled => "CANCELLED",
            Self::Reversed => "REVERSED",
            Self::Settled => "SETTLED",
            Self::PartiallySettled => "PARTIALLY SETTLED",
        }
    }

    /// Status a transaction starts in for a given payment method.
    ///
    /// PayPal payments are captured before the order is placed.
    #[must_use]
    pub const fn initial_for(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Paypal => Self::Captured,
            PaymentMethod::CashOnDelivery => Self::Pending,
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown transaction status: {0}")]
pub struct UnknownTransactionStatus(pub String);

impl FromStr for TransactionStatus {
    type Err = UnknownTransactionStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "PENDING" => Ok(Self::Pending),
            "AUTHORIZED" => Ok(Self::Authorized),
            "CAPTURED" => Ok(Self::Captured),
            "PROCESSING" => Ok(Self::Processing),
            "FAILED" => Ok(Self::Failed),
            "DECLINED" => Ok(Self::Declined),
            "REFUNDED" => Ok(Self::Refunded),
            "PARTIALLY REFUNDED" => Ok(Self::PartiallyRefunded),
            "CHARGEBACK INITIATED" => Ok(Self::ChargebackInitiated),
            "CHARGEBACK WON" => Ok(Self::ChargebackWon),
            "CHARGEBACK LOST" => Ok(Self::ChargebackLost),
            "CANCELLED" => Ok(Self::Cancelled),
            "REVERSED" => Ok(Self::Reversed),
            "SETTLED" => Ok(Self::Settled),
            "PARTIALLY SETTLED" => Ok(Self::PartiallySettled),
            other => Err(UnknownTransactionStatus(other.to_string())),
        }
    }
}

/// Transaction Model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub uuid: TransactionUuid,
    pub order: OrderUuid,
    pub method: PaymentMethod,

    /// Gateway transaction id, set for PayPal payments
    pub external_id: Option<String>,

    /// Amount in minor units
    pub amount: i64,

    pub status: TransactionStatus,
    pub created_at: Timestamp,
}

/// New Transaction Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub uuid: TransactionUuid,
    pub order: OrderUuid,
    pub method: PaymentMethod,
    pub external_id: Option<String>,
    pub amount: i64,
    pub status: TransactionStatus,
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn statuses_round_trip_through_storage_names() -> TestResult {
        assert_eq!(
            "CHARGEBACK INITIATED".parse::<TransactionStatus>()?,
            TransactionStatus::ChargebackInitiated
        );
        assert_eq!(
            serde_json::to_string(&TransactionStatus::PartiallySettled)?,
            "\"PARTIALLY SETTLED\""
        );
        assert_eq!(
            serde_json::to_string(&TransactionStatus::Captured)?,
            "\"CAPTURED\""
        );

        Ok(())
    }

    #[test]
    fn paypal_transactions_start_captured() {
        assert_eq!(
            TransactionStatus::initial_for(PaymentMethod::Paypal),
            TransactionStatus::Captured
        );
        assert_eq!(
            TransactionStatus::initial_for(PaymentMethod::CashOnDelivery),
            TransactionStatus::Pending
        );
    }
}
