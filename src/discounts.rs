//! Discounts
//!
//! A discount document is polymorphic over its [`DiscountKind`], but what it
//! contributes to a line is driven by the optional fields it carries: a
//! `coupon` sub-document, a `fixed` per-unit amount, a `percentage` of the
//! line subtotal and a `free_shipping` flag. Bulk discounts are recognised
//! and snapshotted, they never alter a price.

pub mod resolver;

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    catalog::{CategoryUuid, ProductUuid, VendorUuid},
    uuids::TypedUuid,
};

pub use resolver::resolve_discounts;

/// Discount UUID
pub type DiscountUuid = TypedUuid<Discount>;

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountError {
    /// Percentage calculation could not be represented in minor units.
    #[error("percentage conversion overflowed")]
    PercentConversion,

    /// Multiplying a per-unit amount by the quantity overflowed.
    #[error("discount amount overflowed")]
    Overflow,
}

/// The kinds of discount a vendor can publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountKind {
    /// Applied only when the customer supplies its code.
    Coupon,

    /// A percentage of the line subtotal.
    Percentage,

    /// A fixed amount per unit.
    Fixed,

    /// Buy X get Y. Recognised but not priced.
    Bulk,

    /// Waives the line's shipping cost.
    FreeShipping,
}

impl DiscountKind {
    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Coupon => "COUPON",
            Self::Percentage => "PERCENTAGE",
            Self::Fixed => "FIXED",
            Self::Bulk => "BULK",
            Self::FreeShipping => "FREE_SHIPPING",
        }
    }
}

impl fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised discount kind.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown discount kind: {0}")]
pub struct UnknownDiscountKind(pub String);

impl FromStr for DiscountKind {
    type Err = UnknownDiscountKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "COUPON" => Ok(Self::Coupon),
            "PERCENTAGE" => Ok(Self::Percentage),
            "FIXED" => Ok(Self::Fixed),
            "BULK" => Ok(Self::Bulk),
            "FREE_SHIPPING" => Ok(Self::FreeShipping),
            other => Err(UnknownDiscountKind(other.to_string())),
        }
    }
}

/// Coupon sub-document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    /// Case-sensitive code the customer must supply
    pub code: String,

    /// Percent points taken off the line subtotal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<Decimal>,

    /// Minor units taken off per unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed: Option<i64>,
}

/// Bulk (buy X get Y) sub-document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bulk {
    /// Units to buy
    pub buy: i32,

    /// Units given
    pub get: i32,
}

/// Products and categories a discount is scoped to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountScope {
    /// Directly discounted products
    #[serde(default)]
    pub products: Vec<ProductUuid>,

    /// Discounted categories
    #[serde(default)]
    pub categories: Vec<CategoryUuid>,
}

impl DiscountScope {
    /// Whether the scope covers the product directly or via one of its categories.
    pub fn covers(&self, product: ProductUuid, categories: &[CategoryUuid]) -> bool {
        self.products.contains(&product)
            || categories
                .iter()
                .any(|category| self.categories.contains(category))
    }
}

/// A discount document.
///
/// Order lines embed a full clone of every discount applied to them, so that
/// later edits to the source document never change a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    /// Discount id
    pub uuid: DiscountUuid,

    /// Declared kind
    pub kind: DiscountKind,

    /// Vendor that funds the discount
    pub discounter: VendorUuid,

    /// Products and categories covered
    #[serde(default)]
    pub scope: DiscountScope,

    /// Coupon sub-document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon: Option<Coupon>,

    /// Percent points taken off the line subtotal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<Decimal>,

    /// Minor units taken off per unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed: Option<i64>,

    /// Buy X get Y terms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bulk: Option<Bulk>,

    /// Waives shipping on matched lines
    #[serde(default)]
    pub free_shipping: bool,

    /// Not active before this instant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<Timestamp>,

    /// Maximum number of redemptions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_limit: Option<i64>,

    /// Redemptions so far
    #[serde(default)]
    pub used: i64,

    /// Not active after this instant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<Timestamp>,

    /// Creation time
    pub created_at: Timestamp,
}

impl Discount {
    /// Whether the discount is active at `now`.
    ///
    /// Every bound is optional and an absent bound never excludes.
    pub fn is_active(&self, now: Timestamp) -> bool {
        let started = self.valid_from.is_none_or(|valid_from| valid_from <= now);
        let has_uses_left = self.usage_limit.is_none_or(|limit| self.used < limit);
        let not_expired = self.expiry_date.is_none_or(|expiry| expiry >= now);

        started && has_uses_left && not_expired
    }

    /// Coupon code, if this discount carries a coupon.
    pub fn coupon_code(&self) -> Option<&str> {
        self.coupon.as_ref().map(|coupon| coupon.code.as_str())
    }

    /// Whether the coupon code is among those supplied by the customer.
    pub fn coupon_supplied(&self, codes: &[String]) -> bool {
        self.coupon_code()
            .is_some_and(|code| codes.iter().any(|supplied| supplied == code))
    }

    /// Whether the discount can change a line's discount amount at all.
    pub fn affects_price(&self) -> bool {
        self.coupon.is_some() || self.fixed.is_some() || self.percentage.is_some()
    }

    /// Amount in minor units this discount takes off a line.
    ///
    /// The coupon part counts only when its code was supplied. Within each
    /// part a fixed amount wins over a percentage. Fixed amounts are per unit,
    /// percentages apply to the subtotal which already includes the quantity.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] when the amount cannot be represented.
    pub fn amount(
        &self,
        subtotal: i64,
        quantity: u32,
        codes: &[String],
    ) -> Result<i64, DiscountError> {
        let coupon_part = match &self.coupon {
            Some(coupon) if self.coupon_supplied(codes) => {
                part_amount(coupon.fixed, coupon.percentage, subtotal, quantity)?
            }
            _ => 0,
        };

        let direct_part = part_amount(self.fixed, self.percentage, subtotal, quantity)?;

        coupon_part
            .checked_add(direct_part)
            .ok_or(DiscountError::Overflow)
    }
}

fn part_amount(
    fixed: Option<i64>,
    percentage: Option<Decimal>,
    subtotal: i64,
    quantity: u32,
) -> Result<i64, DiscountError> {
    match (fixed, percentage) {
        (Some(fixed), _) => fixed
            .checked_mul(i64::from(quantity))
            .ok_or(DiscountError::Overflow),
        (None, Some(points)) => percent_of_minor(points, subtotal),
        (None, None) => Ok(0),
    }
}

/// Calculate the discount amount in minor units from percent points and a minor unit amount.
fn percent_of_minor(points: Decimal, minor: i64) -> Result<i64, DiscountError> {
    let Some(applied) = points.checked_mul(Decimal::from(minor)) else {
        return Err(DiscountError::PercentConversion);
    };

    let Some(fraction) = applied.checked_div(Decimal::ONE_HUNDRED) else {
        return Err(DiscountError::PercentConversion);
    };

    let rounded = fraction.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let Some(rounded) = rounded.to_i64() else {
        return Err(DiscountError::PercentConversion);
    };

    Ok(rounded)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use jiff::Timestamp;

    use super::*;

    pub(crate) fn discount(kind: DiscountKind) -> Discount {
        Discount {
            uuid: DiscountUuid::new(),
            kind,
            discounter: VendorUuid::new(),
            scope: DiscountScope::default(),
            coupon: None,
            percentage: None,
            fixed: None,
            bulk: None,
            free_shipping: false,
            valid_from: None,
            usage_limit: None,
            used: 0,
            expiry_date: None,
            created_at: Timestamp::UNIX_EPOCH,
        }
    }

    pub(crate) fn percentage(points: i64) -> Discount {
        Discount {
            percentage: Some(Decimal::from(points)),
            ..discount(DiscountKind::Percentage)
        }
    }

    pub(crate) fn fixed(minor: i64) -> Discount {
        Discount {
            fixed: Some(minor),
            ..discount(DiscountKind::Fixed)
        }
    }

    pub(crate) fn coupon(code: &str, percentage: Option<i64>, fixed: Option<i64>) -> Discount {
        Discount {
            coupon: Some(Coupon {
                code: code.to_string(),
                percentage: percentage.map(Decimal::from),
                fixed,
            }),
            ..discount(DiscountKind::Coupon)
        }
    }
}

#[cfg(test)]
mod tests {
    use jiff::{SignedDuration, Timestamp};
    use testresult::TestResult;

    use super::{fixtures::*, *};

    fn now() -> Timestamp {
        Timestamp::from_second(1_750_000_000).unwrap_or(Timestamp::UNIX_EPOCH)
    }

    #[test]
    fn discount_without_bounds_is_active() {
        assert!(percentage(10).is_active(now()));
    }

    #[test]
    fn future_discount_is_inactive() {
        let discount = Discount {
            valid_from: Some(now() + SignedDuration::from_hours(1)),
            ..percentage(10)
        };

        assert!(!discount.is_active(now()));
    }

    #[test]
    fn expired_discount_is_inactive() {
        let discount = Discount {
            expiry_date: Some(now() - SignedDuration::from_secs(1)),
            ..percentage(10)
        };

        assert!(!discount.is_active(now()));
    }

    #[test]
    fn bounds_are_inclusive() {
        let discount = Discount {
            valid_from: Some(now()),
            expiry_date: Some(now()),
            ..percentage(10)
        };

        assert!(discount.is_active(now()));
    }

    #[test]
    fn exhausted_discount_is_inactive() {
        let exhausted = Discount {
            usage_limit: Some(3),
            used: 3,
            ..percentage(10)
        };

        let remaining = Discount {
            usage_limit: Some(3),
            used: 2,
            ..percentage(10)
        };

        assert!(!exhausted.is_active(now()));
        assert!(remaining.is_active(now()));
    }

    #[test]
    fn percentage_applies_to_subtotal_not_per_unit() -> TestResult {
        // 10% of a 100.00 subtotal for two units is 10.00, not 20.00
        assert_eq!(percentage(10).amount(10_000, 2, &[])?, 1_000);

        Ok(())
    }

    #[test]
    fn fixed_applies_per_unit() -> TestResult {
        assert_eq!(fixed(500).amount(10_000, 2, &[])?, 1_000);

        Ok(())
    }

    #[test]
    fn fixed_wins_over_percentage_on_the_same_document() -> TestResult {
        let discount = Discount {
            percentage: Some(Decimal::from(50)),
            ..fixed(100)
        };

        assert_eq!(discount.amount(10_000, 3, &[])?, 300);

        Ok(())
    }

    #[test]
    fn coupon_requires_supplied_code() -> TestResult {
        let discount = coupon("SPRING10", Some(10), None);

        assert_eq!(discount.amount(10_000, 1, &[])?, 0);
        assert_eq!(discount.amount(10_000, 1, &["spring10".to_string()])?, 0);
        assert_eq!(discount.amount(10_000, 1, &["SPRING10".to_string()])?, 1_000);

        Ok(())
    }

    #[test]
    fn coupon_and_direct_parts_stack() -> TestResult {
        let discount = Discount {
            fixed: Some(200),
            ..coupon("TAKE5", None, Some(500))
        };

        assert_eq!(discount.amount(10_000, 2, &["TAKE5".to_string()])?, 1_400);

        Ok(())
    }

    #[test]
    fn percentage_rounds_half_away_from_zero() -> TestResult {
        let discount = Discount {
            percentage: Some(Decimal::new(125, 1)),
            ..percentage(0)
        };

        // 12.5% of 1.00 is 12.5 minor units
        assert_eq!(discount.amount(100, 1, &[])?, 13);

        Ok(())
    }

    #[test]
    fn bulk_and_free_shipping_take_nothing_off() -> TestResult {
        let bulk = Discount {
            bulk: Some(Bulk { buy: 2, get: 1 }),
            ..discount(DiscountKind::Bulk)
        };

        let free_shipping = Discount {
            free_shipping: true,
            ..discount(DiscountKind::FreeShipping)
        };

        assert!(!bulk.affects_price());
        assert_eq!(bulk.amount(10_000, 3, &[])?, 0);
        assert_eq!(free_shipping.amount(10_000, 3, &[])?, 0);

        Ok(())
    }

    #[test]
    fn fixed_overflow_is_reported() {
        assert_eq!(
            fixed(i64::MAX).amount(0, 2, &[]),
            Err(DiscountError::Overflow)
        );
    }

    #[test]
    fn kind_round_trips_through_storage_names() -> TestResult {
        for kind in [
            DiscountKind::Coupon,
            DiscountKind::Percentage,
            DiscountKind::Fixed,
            DiscountKind::Bulk,
            DiscountKind::FreeShipping,
        ] {
            assert_eq!(kind.as_str().parse::<DiscountKind>()?, kind);
        }

        assert!("SEASONAL".parse::<DiscountKind>().is_err());

        Ok(())
    }
}
