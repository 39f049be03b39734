//! Orders
//!
//! Assembles priced lines into immutable order snapshots and aggregate totals.

use std::fmt;

use jiff::Timestamp;
use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    catalog::{AttributeUuid, CategoryUuid, ImageRef, ProductUuid, VendorUuid},
    discounts::{Discount, DiscountUuid},
    pricing::{PricedLine, PricingError, sum_minor},
};

/// Category as it was when the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySnapshot {
    /// Category id
    pub category_id: CategoryUuid,

    /// Category name
    pub name: String,
}

/// Attribute as it was when the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSnapshot {
    /// Attribute id
    pub attribute_id: AttributeUuid,

    /// Attribute name
    pub name: String,

    /// Attribute value
    pub value: String,

    /// Surcharge in minor units
    #[serde(default)]
    pub extra_price: i64,
}

/// An order line, frozen at placement time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Ordered product
    pub product_id: ProductUuid,

    /// Selling vendor
    pub vendor_id: VendorUuid,

    /// Product name
    pub name: String,

    /// First product image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,

    /// Categories the product was listed under
    #[serde(default)]
    pub categories: Vec<CategorySnapshot>,

    /// Selected attributes
    #[serde(default)]
    pub attributes: Vec<AttributeSnapshot>,

    /// Full copies of the discounts applied
    #[serde(default)]
    pub discounts: Vec<Discount>,

    /// Units ordered
    pub quantity: u32,

    /// Base unit price in minor units
    pub price: i64,

    /// `(price + Σ extra_price) * quantity`
    pub subtotal: i64,

    /// Shipping charged
    pub shipping_cost: i64,

    /// Discount taken off
    pub discount: i64,

    /// `subtotal + shipping_cost - discount`
    pub total: i64,

    /// Product creation time
    pub product_created_at: Timestamp,
}

impl OrderLine {
    /// Freezes a priced line.
    pub fn snapshot(line: &PricedLine) -> Self {
        let product = &line.product;

        Self {
            product_id: product.uuid,
            vendor_id: product.vendor,
            name: product.name.clone(),
            image: product.images.first().cloned(),
            categories: product
                .categories
                .iter()
                .map(|category| CategorySnapshot {
                    category_id: category.uuid,
                    name: category.name.clone(),
                })
                .collect(),
            attributes: line
                .attributes
                .iter()
                .map(|attribute| AttributeSnapshot {
                    attribute_id: attribute.uuid,
                    name: attribute.name.clone(),
                    value: attribute.value.clone(),
                    extra_price: attribute.extra_price_or_zero(),
                })
                .collect(),
            discounts: line.discounts.clone(),
            quantity: line.quantity,
            price: product.price,
            subtotal: line.subtotal,
            shipping_cost: line.shipping_cost,
            discount: line.discount,
            total: line.total,
            product_created_at: product.created_at,
        }
    }
}

/// Aggregate order amounts, each the plain sum over lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    /// Sum of line subtotals
    pub subtotal: i64,

    /// Sum of line shipping costs
    pub shipping_cost: i64,

    /// Sum of line discounts
    pub discount: i64,

    /// Sum of line totals
    pub total: i64,
}

impl OrderTotals {
    /// Sums the amounts of `lines`.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if money arithmetic fails.
    pub fn from_lines(lines: &[OrderLine]) -> Result<Self, PricingError> {
        Ok(Self {
            subtotal: sum_minor(lines.iter().map(|line| line.subtotal))?,
            shipping_cost: sum_minor(lines.iter().map(|line| line.shipping_cost))?,
            discount: sum_minor(lines.iter().map(|line| line.discount))?,
            total: sum_minor(lines.iter().map(|line| line.total))?,
        })
    }
}

/// An order ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledOrder {
    /// Line snapshots, in request order
    pub lines: Vec<OrderLine>,

    /// Distinct vendors, in first-seen order
    pub vendors: Vec<VendorUuid>,

    /// Aggregate amounts
    pub totals: OrderTotals,
}

/// Assembles priced lines into an order.
///
/// # Errors
///
/// Returns a [`PricingError`] if the aggregates cannot be summed.
pub fn assemble_order(lines: &[PricedLine]) -> Result<AssembledOrder, PricingError> {
    let snapshots: Vec<OrderLine> = lines.iter().map(OrderLine::snapshot).collect();

    let mut seen: FxHashSet<VendorUuid> = FxHashSet::default();
    let vendors = snapshots
        .iter()
        .map(|line| line.vendor_id)
        .filter(|vendor| seen.insert(*vendor))
        .collect();

    let totals = OrderTotals::from_lines(&snapshots)?;

    Ok(AssembledOrder {
        lines: snapshots,
        vendors,
        totals,
    })
}

/// Value of an applied coupon, reported back to the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponValue {
    /// Percent points off the subtotal
    Percentage(Decimal),

    /// Minor units off per unit
    Fixed(i64),
}

/// Summary of a coupon discount applied to a quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponDiscountSummary {
    /// Coupon discount id
    pub discount_id: DiscountUuid,

    /// Coupon code
    pub code: String,

    /// What the coupon takes off, absent when it carries neither amount
    #[serde(flatten, default, skip_serializing_if = "Option::is_none")]
    pub value: Option<CouponValue>,
}

/// Price preview of a set of lines, nothing persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Aggregate amounts
    #[serde(flatten)]
    pub totals: OrderTotals,

    /// Coupons that contributed, empty unless codes were supplied
    pub coupon_discounts: Vec<CouponDiscountSummary>,
}

/// Builds a quote from priced lines.
///
/// Coupons are only summarised when `codes` is non-empty, and each coupon is
/// listed once however many lines it applied to.
///
/// # Errors
///
/// Returns a [`PricingError`] if the aggregates cannot be summed.
pub fn quote(lines: &[PricedLine], codes: &[String]) -> Result<Quote, PricingError> {
    let assembled = assemble_order(lines)?;

    let mut coupon_discounts = Vec::new();

    if !codes.is_empty() {
        let mut seen: FxHashSet<DiscountUuid> = FxHashSet::default();

        for discount in lines.iter().flat_map(|line| &line.discounts) {
            let Some(coupon) = &discount.coupon else {
                continue;
            };

            if !discount.coupon_supplied(codes) || !seen.insert(discount.uuid) {
                continue;
            }

            let value = match (coupon.fixed, coupon.percentage) {
                (Some(fixed), _) => Some(CouponValue::Fixed(fixed)),
                (None, Some(points)) => Some(CouponValue::Percentage(points)),
                (None, None) => None,
            };

            coupon_discounts.push(CouponDiscountSummary {
                discount_id: discount.uuid,
                code: coupon.code.clone(),
                value,
            });
        }
    }

    Ok(Quote {
        totals: assembled.totals,
        coupon_discounts,
    })
}

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Awaiting vendor approval
    #[default]
    #[serde(rename = "PENDING APPROVAL")]
    PendingApproval,

    /// Approved by the vendor
    #[serde(rename = "APPROVED")]
    Approved,

    /// Being prepared
    #[serde(rename = "PROCESSING")]
    Processing,

    /// Handed to the carrier
    #[serde(rename = "SHIPPED")]
    Shipped,

    /// Received by the customer
    #[serde(rename = "DELIVERED")]
    Delivered,

    /// Cancelled before delivery
    #[serde(rename = "CANCELLED")]
    Cancelled,

    /// Sent back after delivery
    #[serde(rename = "RETURNED")]
    Returned,
}

impl OrderStatus {
    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PendingApproval => "PENDING APPROVAL",
            Self::Approved => "APPROVED",
            Self::Processing => "PROCESSING",
            Self::Shipped => "SHIPPED",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
            Self::Returned => "RETURNED",
        }
    }

    /// Parses the storage representation.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownOrderStatus`] for anything else.
    pub fn parse(value: &str) -> Result<Self, UnknownOrderStatus> {
        match value {
            "PENDING APPROVAL" => Ok(Self::PendingApproval),
            "APPROVED" => Ok(Self::Approved),
            "PROCESSING" => Ok(Self::Processing),
            "SHIPPED" => Ok(Self::Shipped),
            "DELIVERED" => Ok(Self::Delivered),
            "CANCELLED" => Ok(Self::Cancelled),
            "RETURNED" => Ok(Self::Returned),
            other => Err(UnknownOrderStatus(other.to_string())),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised order status.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown order status: {0}")]
pub struct UnknownOrderStatus(pub String);
