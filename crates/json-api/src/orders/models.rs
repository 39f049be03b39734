//! Order request and response bodies

use martina::{
    catalog::{AttributeUuid, ProductUuid},
    discounts::Discount,
    orders::{CouponDiscountSummary, CouponValue, OrderLine, Quote},
};
use martina_app::domain::{
    orders::models::Order,
    payments::models::{PaymentMethod, Transaction},
    placement::models::{DraftLine, OrderDraft, PaymentDetails, PlacementOutcome, PlacementRequest},
    trackings::models::Tracking,
    users::models::AddressUuid,
};
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::envelope::ApiError;

/// Requested product line
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub(crate) struct DraftLineRequest {
    /// Product to buy
    pub product_id: Uuid,

    /// Units to buy, at least one
    pub quantity: i64,
}

/// Products, attributes and coupons shared by every order request.
pub(crate) fn order_draft(
    products: Vec<DraftLineRequest>,
    attributes: Vec<Uuid>,
    coupons: Vec<String>,
) -> OrderDraft {
    OrderDraft {
        products: products
            .into_iter()
            .map(|line| DraftLine {
                product_id: ProductUuid::from_uuid(line.product_id),
                quantity: line.quantity,
            })
            .collect(),
        attributes: attributes.into_iter().map(AttributeUuid::from_uuid).collect(),
        coupons,
    }
}

/// Quote Request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub(crate) struct QuoteRequest {
    /// Requested lines
    #[serde(default)]
    pub products: Vec<DraftLineRequest>,

    /// Attributes picked across all lines
    #[serde(default)]
    pub attributes: Vec<Uuid>,

    /// Coupon codes, case-sensitive
    #[serde(default)]
    pub coupons: Vec<String>,
}

impl From<QuoteRequest> for OrderDraft {
    fn from(request: QuoteRequest) -> Self {
        order_draft(request.products, request.attributes, request.coupons)
    }
}

/// Payment Request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaymentRequest {
    /// `CASH_ON_DELIVERY` or `PAYPAL`
    pub method: String,

    /// PayPal capture id, required for `PAYPAL`
    #[serde(default)]
    pub transaction_id: Option<String>,
}

/// Place Order Request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub(crate) struct PlaceOrderRequest {
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

    /// How the order is paid
    pub payment: PaymentRequest,
}

impl TryFrom<PlaceOrderRequest> for PlacementRequest {
    type Error = ApiError;

    fn try_from(request: PlaceOrderRequest) -> Result<Self, Self::Error> {
        let method = request.payment.method.parse::<PaymentMethod>().map_err(|_ignored| {
            ApiError::bad_request(
                "Payment method must be CASH_ON_DELIVERY or PAYPAL",
                "payment_method_invalid",
            )
        })?;

        Ok(PlacementRequest {
            draft: order_draft(request.products, request.attributes, request.coupons),
            address: request.address.map(AddressUuid::from_uuid),
            payment: PaymentDetails {
                method,
                transaction_id: request.payment.transaction_id,
            },
        })
    }
}

/// Attribute picked on an order line
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderLineAttributeResponse {
    pub attribute_id: Uuid,
    pub name: String,
    pub value: String,

    /// Surcharge per unit, minor units
    pub extra_price: i64,
}

/// Discount applied to an order line
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderLineDiscountResponse {
    pub discount_id: Uuid,

    /// Discount kind, e.g. `PERCENTAGE`
    pub kind: String,

    /// Coupon code, for coupon discounts
    pub coupon_code: Option<String>,
}

impl From<&Discount> for OrderLineDiscountResponse {
    fn from(discount: &Discount) -> Self {
        Self {
            discount_id: discount.uuid.into_uuid(),
            kind: discount.kind.as_str().to_string(),
            coupon_code: discount.coupon_code().map(str::to_string),
        }
    }
}

/// Order Line Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderLineResponse {
    pub product_id: Uuid,
    pub vendor_id: Uuid,
    pub name: String,

    /// First product image
    pub image_url: Option<String>,

    /// Category names at placement time
    pub categories: Vec<String>,

    pub attributes: Vec<OrderLineAttributeResponse>,
    pub discounts: Vec<OrderLineDiscountResponse>,
    pub quantity: u32,

    /// Amounts below are minor units
    pub price: i64,
    pub subtotal: i64,
    pub shipping_cost: i64,
    pub discount: i64,
    pub total: i64,
}

impl From<OrderLine> for OrderLineResponse {
    fn from(line: OrderLine) -> Self {
        Self {
            product_id: line.product_id.into_uuid(),
            vendor_id: line.vendor_id.into_uuid(),
            name: line.name,
            image_url: line.image.map(|image| image.url),
            categories: line
                .categories
                .into_iter()
                .map(|category| category.name)
                .collect(),
            attributes: line
                .attributes
                .into_iter()
                .map(|attribute| OrderLineAttributeResponse {
                    attribute_id: attribute.attribute_id.into_uuid(),
                    name: attribute.name,
                    value: attribute.value,
                    extra_price: attribute.extra_price,
                })
                .collect(),
            discounts: line
                .discounts
                .iter()
                .map(OrderLineDiscountResponse::from)
                .collect(),
            quantity: line.quantity,
            price: line.price,
            subtotal: line.subtotal,
            shipping_cost: line.shipping_cost,
            discount: line.discount,
            total: line.total,
        }
    }
}

/// Order Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderResponse {
    pub uuid: Uuid,
    pub customer_id: Uuid,
    pub address_id: Uuid,

    /// Distinct vendors, in first-seen order
    pub vendor_ids: Vec<Uuid>,

    pub lines: Vec<OrderLineResponse>,
    pub subtotal: i64,
    pub shipping_cost: i64,
    pub discount: i64,
    pub total: i64,

    /// e.g. `PENDING APPROVAL`
    pub status: String,

    pub created_at: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            uuid: order.uuid.into_uuid(),
            customer_id: order.customer.into_uuid(),
            address_id: order.address.into_uuid(),
            vendor_ids: order.vendors.iter().map(|vendor| vendor.into_uuid()).collect(),
            lines: order.lines.into_iter().map(OrderLineResponse::from).collect(),
            subtotal: order.totals.subtotal,
            shipping_cost: order.totals.shipping_cost,
            discount: order.totals.discount,
            total: order.totals.total,
            status: order.status.as_str().to_string(),
            created_at: order.created_at.to_string(),
        }
    }
}

/// Transaction Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct TransactionResponse {
    pub uuid: Uuid,
    pub method: String,
    pub external_id: Option<String>,

    /// Minor units
    pub amount: i64,

    pub status: String,
    pub created_at: String,
}

impl From<Transaction> for TransactionResponse {
    fn from(transaction: Transaction) -> Self {
        Self {
            uuid: transaction.uuid.into_uuid(),
            method: transaction.method.as_str().to_string(),
            external_id: transaction.external_id,
            amount: transaction.amount,
            status: transaction.status.as_str().to_string(),
            created_at: transaction.created_at.to_string(),
        }
    }
}

/// Tracking Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct TrackingResponse {
    pub uuid: Uuid,
    pub method: String,
    pub shipping_date: String,
    pub event: String,
    pub status: String,
}

impl From<Tracking> for TrackingResponse {
    fn from(tracking: Tracking) -> Self {
        Self {
            uuid: tracking.uuid.into_uuid(),
            method: tracking.method.as_str().to_string(),
            shipping_date: tracking.shipping_date.to_string(),
            event: tracking.event,
            status: tracking.status,
        }
    }
}

/// Placed Order Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PlacedOrderResponse {
    pub order: OrderResponse,
    pub transaction: TransactionResponse,
    pub tracking: TrackingResponse,

    /// Final placement state, `SIDE_EFFECTS_APPLIED`
    pub state: String,
}

impl From<PlacementOutcome> for PlacedOrderResponse {
    fn from(outcome: PlacementOutcome) -> Self {
        Self {
            order: outcome.order.into(),
            transaction: outcome.transaction.into(),
            tracking: outcome.tracking.into(),
            state: outcome.state.as_str().to_string(),
        }
    }
}

/// Coupon applied to a quote
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CouponDiscountResponse {
    pub discount_id: Uuid,
    pub code: String,

    /// Percent points off, as a decimal string
    pub percentage: Option<String>,

    /// Minor units off per unit
    pub fixed: Option<i64>,
}

impl From<CouponDiscountSummary> for CouponDiscountResponse {
    fn from(summary: CouponDiscountSummary) -> Self {
        let (percentage, fixed) = match summary.value {
            Some(CouponValue::Percentage(percentage)) => (Some(percentage.to_string()), None),
            Some(CouponValue::Fixed(fixed)) => (None, Some(fixed)),
            None => (None, None),
        };

        Self {
            discount_id: summary.discount_id.into_uuid(),
            code: summary.code,
            percentage,
            fixed,
        }
    }
}

/// Quote Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct QuoteResponse {
    pub subtotal: i64,
    pub shipping_cost: i64,
    pub discount: i64,

    /// May be negative, discounts stack without a cap
    pub total: i64,

    pub coupon_discounts: Vec<CouponDiscountResponse>,
}

impl From<Quote> for QuoteResponse {
    fn from(quote: Quote) -> Self {
        Self {
            subtotal: quote.totals.subtotal,
            shipping_cost: quote.totals.shipping_cost,
            discount: quote.totals.discount,
            total: quote.totals.total,
            coupon_discounts: quote
                .coupon_discounts
                .into_iter()
                .map(CouponDiscountResponse::from)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn place_order_request_converts_to_placement_request() -> TestResult {
        let product = Uuid::now_v7();
        let address = Uuid::now_v7();

        let request: PlaceOrderRequest = serde_json::from_value(json!({
            "products": [{ "product_id": product, "quantity": 2 }],
            "coupons": ["SOFA15"],
            "address": address,
            "payment": { "method": "PAYPAL", "transaction_id": "8MC585209K746392H" }
        }))?;

        let placement = PlacementRequest::try_from(request)?;

        assert_eq!(placement.draft.products.len(), 1);
        assert_eq!(placement.draft.coupons, vec!["SOFA15".to_string()]);
        assert_eq!(placement.address, Some(AddressUuid::from_uuid(address)));
        assert_eq!(placement.payment.method, PaymentMethod::Paypal);
        assert_eq!(
            placement.payment.transaction_id.as_deref(),
            Some("8MC585209K746392H")
        );

        Ok(())
    }

    #[test]
    fn unknown_payment_method_is_a_bad_request() -> TestResult {
        let request: PlaceOrderRequest = serde_json::from_value(json!({
            "products": [],
            "payment": { "method": "BITCOIN" }
        }))?;

        let error = PlacementRequest::try_from(request).err();

        assert_eq!(error.as_ref().map(ApiError::reason), Some("payment_method_invalid"));

        Ok(())
    }
}
