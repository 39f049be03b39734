//! Payment request and response bodies

use martina_app::domain::{
    payments::{CapturedPayment, ExternalPaymentOrder},
    placement::models::ExternalPaymentRequest,
    users::models::AddressUuid,
};
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::orders::models::{DraftLineRequest, order_draft};

/// PayPal Order Request
///
/// The amount is never taken from the client, it is recomputed from the draft.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaypalOrderRequest {
    /// Requested lines
    #[serde(default)]
    pub products: Vec<DraftLineRequest>,

    /// Attributes picked across all lines
    #[serde(default)]
    pub attributes: Vec<Uuid>,

    /// Coupon codes, case-sensitive
    #[serde(default)]
    pub coupons: Vec<String>,

    /// Delivery address owned by the caller
    #[serde(default)]
    pub address: Option<Uuid>,
}

impl From<PaypalOrderRequest> for ExternalPaymentRequest {
    fn from(request: PaypalOrderRequest) -> Self {
        ExternalPaymentRequest {
            draft: order_draft(request.products, request.attributes, request.coupons),
            address: request.address.map(AddressUuid::from_uuid),
        }
    }
}

/// PayPal Order Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaypalOrderResponse {
    /// PayPal order id, approved by the customer and then captured
    pub id: String,

    /// Amount with two decimals, e.g. `39.00`
    pub value: String,

    pub currency_code: String,
}

impl From<ExternalPaymentOrder> for PaypalOrderResponse {
    fn from(order: ExternalPaymentOrder) -> Self {
        Self {
            id: order.id,
            value: order.value,
            currency_code: order.currency_code,
        }
    }
}

/// Captured Payment Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CapturedPaymentResponse {
    /// Supply as `payment.transaction_id` when placing the order
    pub transaction_id: String,
}

impl From<CapturedPayment> for CapturedPaymentResponse {
    fn from(captured: CapturedPayment) -> Self {
        Self {
            transaction_id: captured.transaction_id,
        }
    }
}
