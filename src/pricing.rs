//! Pricing

use rust_decimal::Decimal;
use rusty_money::{Money, MoneyError, iso};
use thiserror::Error;

use crate::{
    catalog::{Attribute, AttributeSelection, Product},
    discounts::{Discount, DiscountError},
};

/// Flat shipping charge per line, in minor units (one currency unit).
pub const SHIPPING_COST: i64 = 100;

/// ISO code of the store currency.
pub const CURRENCY_CODE: &str = "USD";

/// Errors that can occur while pricing a line.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// Quantities must be at least one.
    #[error("quantity must be a positive integer")]
    InvalidQuantity,

    /// Line arithmetic overflowed.
    #[error("line amount overflowed")]
    Overflow,

    /// External payments need something to charge.
    #[error("payable total must be positive, got {0} minor units")]
    NonPositiveTotal(i64),

    /// Errors bubbled up from discount calculation.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// A priced order line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    /// Product as read at pricing time
    pub product: Product,

    /// Attributes selected for this line
    pub attributes: Vec<Attribute>,

    /// Active discounts matched to this line
    pub discounts: Vec<Discount>,

    /// Units ordered
    pub quantity: u32,

    /// Sum of the selected attributes' surcharges
    pub extra_price: i64,

    /// `(price + extra_price) * quantity`
    pub subtotal: i64,

    /// Shipping charged for the line
    pub shipping_cost: i64,

    /// Sum of every matched discount's amount
    pub discount: i64,

    /// `subtotal + shipping_cost - discount`, uncapped
    pub total: i64,
}

/// Prices a single line.
///
/// Every matched discount applies, nothing is capped, so a heavily discounted
/// line can come out with a negative total.
///
/// # Errors
///
/// - [`PricingError::InvalidQuantity`]: `quantity` is zero.
/// - [`PricingError::Overflow`]: an intermediate amount does not fit.
/// - [`PricingError::Discount`]: a discount amount could not be computed.
pub fn price_line(
    product: &Product,
    quantity: u32,
    selection: &AttributeSelection,
    discounts: Vec<Discount>,
    codes: &[String],
) -> Result<PricedLine, PricingError> {
    if quantity == 0 {
        return Err(PricingError::InvalidQuantity);
    }

    let attributes: Vec<Attribute> = selection.select(product).into_iter().cloned().collect();

    let extra_price = attributes
        .iter()
        .try_fold(0_i64, |acc, attribute| {
            acc.checked_add(attribute.extra_price_or_zero())
        })
        .ok_or(PricingError::Overflow)?;

    let subtotal = product
        .price
        .checked_add(extra_price)
        .and_then(|unit| unit.checked_mul(i64::from(quantity)))
        .ok_or(PricingError::Overflow)?;

    let shipping_cost = if discounts.iter().any(|discount| discount.free_shipping) {
        0
    } else {
        SHIPPING_COST
    };

    let discount = discounts
        .iter()
        .filter(|discount| discount.affects_price())
        .try_fold(0_i64, |acc, discount| {
            let amount = discount.amount(subtotal, quantity, codes)?;

            acc.checked_add(amount).ok_or(PricingError::Overflow)
        })?;

    let total = subtotal
        .checked_add(shipping_cost)
        .and_then(|gross| gross.checked_sub(discount))
        .ok_or(PricingError::Overflow)?;

    Ok(PricedLine {
        product: product.clone(),
        attributes,
        discounts,
        quantity,
        extra_price,
        subtotal,
        shipping_cost,
        discount,
        total,
    })
}

/// The amount handed to an external payment gateway.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayableAmount<'a> {
    money: Money<'a, iso::Currency>,
}

impl PayableAmount<'_> {
    /// Amount in minor units.
    pub fn minor_units(&self) -> i64 {
        self.money.to_minor_units()
    }

    /// Amount with exactly two decimals, e.g. `"123.45"`.
    pub fn value(&self) -> String {
        Decimal::new(self.money.to_minor_units(), 2).to_string()
    }

    /// ISO currency code.
    pub fn currency_code(&self) -> &'static str {
        CURRENCY_CODE
    }
}

/// Converts a recomputed order total into the amount charged externally.
///
/// # Errors
///
/// Returns [`PricingError::NonPositiveTotal`] when there is nothing to charge.
pub fn payable_amount(total: i64) -> Result<PayableAmount<'static>, PricingError> {
    if total <= 0 {
        return Err(PricingError::NonPositiveTotal(total));
    }

    Ok(PayableAmount {
        money: Money::from_minor(total, iso::USD),
    })
}

/// Sums minor unit amounts through [`Money`] so currency arithmetic errors surface.
///
/// # Errors
///
/// Returns a [`PricingError::Money`] if money arithmetic fails.
pub fn sum_minor<I>(amounts: I) -> Result<i64, PricingError>
where
    I: IntoIterator<Item = i64>,
{
    let total = amounts
        .into_iter()
        .try_fold(Money::from_minor(0, iso::USD), |acc, amount| {
            acc.add(Money::from_minor(amount, iso::USD))
        })?;

    Ok(total.to_minor_units())
}
