//! Discount Resolver

use jiff::Timestamp;
use rustc_hash::FxHashSet;

use crate::{
    catalog::{CategoryUuid, ProductUuid},
    discounts::{Discount, DiscountUuid},
};

/// Returns the candidates that apply to a product at `now`.
///
/// A discount matches when its scope covers the product or one of its
/// categories, or when it carries a coupon whose code was supplied. A supplied
/// coupon matches whatever its scope. Candidates are never assumed to be
/// active, each one is re-checked against `now`. Every match is returned once,
/// in candidate order, as an owned snapshot.
pub fn resolve_discounts(
    candidates: &[Discount],
    product: ProductUuid,
    categories: &[CategoryUuid],
    codes: &[String],
    now: Timestamp,
) -> Vec<Discount> {
    let mut seen: FxHashSet<DiscountUuid> = FxHashSet::default();

    candidates
        .iter()
        .filter(|discount| matches_product(discount, product, categories, codes))
        .filter(|discount| discount.is_active(now))
        .filter(|discount| seen.insert(discount.uuid))
        .cloned()
        .collect()
}

fn matches_product(
    discount: &Discount,
    product: ProductUuid,
    categories: &[CategoryUuid],
    codes: &[String],
) -> bool {
    discount.scope.covers(product, categories) || discount.coupon_supplied(codes)
}

#[cfg(test)]
mod tests {
    use jiff::{SignedDuration, Timestamp};

    use crate::{
        catalog::{CategoryUuid, ProductUuid},
        discounts::{Discount, DiscountScope, fixtures::*},
    };

    use super::*;

    fn now() -> Timestamp {
        Timestamp::from_second(1_750_000_000).unwrap_or(Timestamp::UNIX_EPOCH)
    }

    fn scoped_to_product(discount: Discount, product: ProductUuid) -> Discount {
        Discount {
            scope: DiscountScope {
                products: vec![product],
                categories: Vec::new(),
            },
            ..discount
        }
    }

    fn scoped_to_category(discount: Discount, category: CategoryUuid) -> Discount {
        Discount {
            scope: DiscountScope {
                products: Vec::new(),
                categories: vec![category],
            },
            ..discount
        }
    }

    #[test]
    fn matches_product_and_category_scopes() {
        let product = ProductUuid::new();
        let category = CategoryUuid::new();

        let direct = scoped_to_product(fixed(500), product);
        let via_category = scoped_to_category(percentage(10), category);
        let unrelated = scoped_to_product(fixed(100), ProductUuid::new());

        let resolved = resolve_discounts(
            &[direct.clone(), via_category.clone(), unrelated],
            product,
            &[category],
            &[],
            now(),
        );

        assert_eq!(resolved, vec![direct, via_category]);
    }

    #[test]
    fn expired_candidates_are_dropped() {
        let product = ProductUuid::new();

        let expired = Discount {
            expiry_date: Some(now() - SignedDuration::from_hours(24)),
            ..scoped_to_product(fixed(500), product)
        };

        let resolved = resolve_discounts(&[expired], product, &[], &[], now());

        assert!(resolved.is_empty(), "expired discount should not resolve");
    }

    #[test]
    fn discount_matched_twice_is_returned_once() {
        let product = ProductUuid::new();
        let category = CategoryUuid::new();

        let discount = Discount {
            scope: DiscountScope {
                products: vec![product],
                categories: vec![category],
            },
            ..percentage(10)
        };

        let resolved = resolve_discounts(
            &[discount.clone(), discount.clone()],
            product,
            &[category],
            &[],
            now(),
        );

        assert_eq!(resolved, vec![discount]);
    }

    #[test]
    fn store_wide_coupon_matches_only_when_supplied() {
        let product = ProductUuid::new();
        let store_wide = coupon("WELCOME", Some(5), None);

        let without_code = resolve_discounts(&[store_wide.clone()], product, &[], &[], now());
        let with_code = resolve_discounts(
            &[store_wide.clone()],
            product,
            &[],
            &["WELCOME".to_string()],
            now(),
        );

        assert!(without_code.is_empty(), "coupon needs its code");
        assert_eq!(with_code, vec![store_wide]);
    }

    #[test]
    fn supplied_coupon_matches_outside_its_scope() {
        let product = ProductUuid::new();
        let elsewhere = scoped_to_product(coupon("LAMPS", Some(20), None), ProductUuid::new());

        let without_code = resolve_discounts(&[elsewhere.clone()], product, &[], &[], now());
        let with_code = resolve_discounts(
            &[elsewhere.clone()],
            product,
            &[],
            &["LAMPS".to_string()],
            now(),
        );

        assert!(without_code.is_empty(), "coupon needs its code");
        assert_eq!(with_code, vec![elsewhere]);
    }

    #[test]
    fn supplied_coupon_matched_by_scope_and_code_is_returned_once() {
        let product = ProductUuid::new();
        let scoped = scoped_to_product(coupon("LAMPS", Some(20), None), product);

        let resolved = resolve_discounts(
            &[scoped.clone()],
            product,
            &[],
            &["LAMPS".to_string()],
            now(),
        );

        assert_eq!(resolved, vec![scoped]);
    }

    #[test]
    fn supplied_coupon_is_still_checked_for_activity() {
        let product = ProductUuid::new();

        let exhausted = Discount {
            usage_limit: Some(3),
            used: 3,
            ..coupon("LAMPS", Some(20), None)
        };

        let resolved = resolve_discounts(&[exhausted], product, &[], &["LAMPS".to_string()], now());

        assert!(resolved.is_empty(), "exhausted coupon should not resolve");
    }
}
