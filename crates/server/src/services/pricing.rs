//! Pure pricing computation for checkout.
//!
//! All functions here are deterministic and perform no I/O: given the same
//! line items, settings, and discount they always produce the same totals.
//! Every monetary component is rounded to 2 decimal places with banker's
//! rounding (`MidpointNearestEven`) before summation, so the identity
//! `total = subtotal - discount + shipping + tax` holds exactly over the
//! values that get stored and displayed.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::Settings;

/// Number of decimal places for monetary amounts.
const MONEY_SCALE: u32 = 2;

/// A line item as seen by the pricing engine: unit price and quantity.
#[derive(Debug, Clone, Copy)]
pub struct PricedLine {
    pub price: Decimal,
    pub quantity: i32,
}

/// The full price breakdown for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// Errors from pricing computation.
///
/// Both variants indicate corrupted configuration data, not client error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PricingError {
    /// Tax rate outside `[0, 1]` or negative shipping cost.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    /// Discount percent outside `[0, 100]`.
    #[error("invalid discount percent: {0}")]
    InvalidDiscount(Decimal),
}

/// Round a monetary amount to 2 decimal places, half-even.
fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Compute the price breakdown for a set of line items.
///
/// - `subtotal` = Σ price × quantity
/// - `discount_amount` = subtotal × percent / 100
/// - `shipping` = 0 when a free-shipping threshold is configured and the
///   discounted subtotal exceeds it, otherwise the flat shipping cost
/// - `tax` = discounted subtotal × tax rate
/// - `total` = discounted subtotal + shipping + tax
///
/// # Errors
///
/// Returns [`PricingError::InvalidSettings`] if the tax rate is outside
/// `[0, 1]` or the shipping cost is negative, and
/// [`PricingError::InvalidDiscount`] if `discount_percent` is outside
/// `[0, 100]`.
pub fn compute_totals(
    items: &[PricedLine],
    settings: &Settings,
    discount_percent: Decimal,
) -> Result<Totals, PricingError> {
    if settings.tax_rate < Decimal::ZERO || settings.tax_rate > Decimal::ONE {
        return Err(PricingError::InvalidSettings(format!(
            "tax rate {} outside [0, 1]",
            settings.tax_rate
        )));
    }
    if settings.shipping_cost < Decimal::ZERO {
        return Err(PricingError::InvalidSettings(format!(
            "negative shipping cost {}",
            settings.shipping_cost
        )));
    }
    if discount_percent < Decimal::ZERO || discount_percent > Decimal::ONE_HUNDRED {
        return Err(PricingError::InvalidDiscount(discount_percent));
    }

    let subtotal = round_money(
        items
            .iter()
            .map(|line| line.price * Decimal::from(line.quantity))
            .sum(),
    );

    let discount_amount = round_money(subtotal * discount_percent / Decimal::ONE_HUNDRED);
    let discounted_subtotal = subtotal - discount_amount;

    let free_shipping = settings
        .free_shipping_threshold
        .is_some_and(|threshold| discounted_subtotal > threshold);
    let shipping = if free_shipping {
        Decimal::ZERO
    } else {
        round_money(settings.shipping_cost)
    };

    let tax = round_money(discounted_subtotal * settings.tax_rate);
    let total = discounted_subtotal + shipping + tax;

    Ok(Totals {
        subtotal,
        discount_amount,
        shipping,
        tax,
        total,
    })
}

/// Check a submitted discount code against the settings.
///
/// Matching is a case-insensitive exact comparison, and only succeeds when
/// the discount is active and a code is configured. Returns the discount
/// percent on a match. There is deliberately no expiry or usage limit: the
/// store runs a single global code.
#[must_use]
pub fn validate_discount_code(code: &str, settings: &Settings) -> Option<Decimal> {
    if !settings.discount_active || settings.discount_code.is_empty() {
        return None;
    }

    code.trim()
        .eq_ignore_ascii_case(&settings.discount_code)
        .then_some(settings.discount_percent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn settings(tax_rate: &str, shipping: &str) -> Settings {
        Settings {
            tax_rate: tax_rate.parse().expect("decimal"),
            shipping_cost: shipping.parse().expect("decimal"),
            free_shipping_threshold: None,
            discount_code: String::new(),
            discount_percent: Decimal::ZERO,
            discount_active: false,
            updated_at: Utc::now(),
        }
    }

    fn line(price: &str, quantity: i32) -> PricedLine {
        PricedLine {
            price: price.parse().expect("decimal"),
            quantity,
        }
    }

    #[test]
    fn test_breakdown_with_discount() {
        // subtotal 1000, 10% discount, 8% tax, flat 15 shipping
        let totals = compute_totals(
            &[line("250", 4)],
            &settings("0.08", "15"),
            Decimal::from(10),
        )
        .expect("totals");

        assert_eq!(totals.subtotal, Decimal::from(1000));
        assert_eq!(totals.discount_amount, Decimal::from(100));
        assert_eq!(totals.shipping, Decimal::from(15));
        assert_eq!(totals.tax, Decimal::from(72));
        assert_eq!(totals.total, Decimal::from(987));
    }

    #[test]
    fn test_free_shipping_above_threshold() {
        let mut s = settings("0.08", "15");
        s.free_shipping_threshold = Some(Decimal::from(1000));

        let totals =
            compute_totals(&[line("600", 2)], &s, Decimal::ZERO).expect("totals");
        assert_eq!(totals.shipping, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::from(1296));
    }

    #[test]
    fn test_threshold_applies_to_discounted_subtotal() {
        // 1000 gross, 10% off leaves 900, which does not clear a 1000
        // threshold, so shipping is still charged.
        let mut s = settings("0.08", "15");
        s.free_shipping_threshold = Some(Decimal::from(1000));

        let totals =
            compute_totals(&[line("250", 4)], &s, Decimal::from(10)).expect("totals");
        assert_eq!(totals.shipping, Decimal::from(15));
    }

    #[test]
    fn test_total_identity_holds() {
        let totals = compute_totals(
            &[line("19.99", 3), line("4.50", 1), line("129.95", 2)],
            &settings("0.0725", "9.99"),
            Decimal::from(15),
        )
        .expect("totals");

        assert_eq!(
            totals.total,
            totals.subtotal - totals.discount_amount + totals.shipping + totals.tax
        );
        // All components are at money scale
        for amount in [
            totals.subtotal,
            totals.discount_amount,
            totals.shipping,
            totals.tax,
            totals.total,
        ] {
            assert!(amount.scale() <= 2, "unrounded amount: {amount}");
        }
    }

    #[test]
    fn test_bankers_rounding_on_tax() {
        // 4.69 * 0.5 = 2.345, which rounds half-even to 2.34
        let totals =
            compute_totals(&[line("4.69", 1)], &settings("0.5", "0"), Decimal::ZERO)
                .expect("totals");
        assert_eq!(totals.tax, "2.34".parse::<Decimal>().expect("decimal"));
    }

    #[test]
    fn test_deterministic() {
        let items = [line("42.42", 2), line("3.14", 5)];
        let s = settings("0.08", "15");
        let a = compute_totals(&items, &s, Decimal::from(5)).expect("totals");
        let b = compute_totals(&items, &s, Decimal::from(5)).expect("totals");
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_cart_prices_to_shipping_only() {
        let totals =
            compute_totals(&[], &settings("0.08", "15"), Decimal::ZERO).expect("totals");
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::from(15));
    }

    #[test]
    fn test_invalid_tax_rate() {
        let result = compute_totals(&[line("10", 1)], &settings("1.5", "15"), Decimal::ZERO);
        assert!(matches!(result, Err(PricingError::InvalidSettings(_))));
    }

    #[test]
    fn test_negative_shipping() {
        let result = compute_totals(&[line("10", 1)], &settings("0.08", "-1"), Decimal::ZERO);
        assert!(matches!(result, Err(PricingError::InvalidSettings(_))));
    }

    #[test]
    fn test_invalid_discount_percent() {
        let result =
            compute_totals(&[line("10", 1)], &settings("0.08", "15"), Decimal::from(101));
        assert!(matches!(result, Err(PricingError::InvalidDiscount(_))));
    }

    #[test]
    fn test_discount_code_case_insensitive() {
        let mut s = settings("0.08", "15");
        s.discount_code = "SAVE10".to_owned();
        s.discount_percent = Decimal::from(10);
        s.discount_active = true;

        assert_eq!(validate_discount_code("save10", &s), Some(Decimal::from(10)));
        assert_eq!(validate_discount_code("SAVE10", &s), Some(Decimal::from(10)));
        assert_eq!(validate_discount_code(" Save10 ", &s), Some(Decimal::from(10)));
        assert_eq!(validate_discount_code("save20", &s), None);
    }

    #[test]
    fn test_discount_code_requires_active() {
        let mut s = settings("0.08", "15");
        s.discount_code = "SAVE10".to_owned();
        s.discount_percent = Decimal::from(10);
        s.discount_active = false;

        assert_eq!(validate_discount_code("SAVE10", &s), None);
    }

    #[test]
    fn test_empty_configured_code_never_matches() {
        let mut s = settings("0.08", "15");
        s.discount_active = true;

        assert_eq!(validate_discount_code("", &s), None);
    }
}
