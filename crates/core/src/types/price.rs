//! Price helpers using decimal arithmetic.
//!
//! Prices are plain `Decimal` amounts in the shop currency (Egyptian pounds,
//! displayed with an `LE` suffix). There is a single pricing model: a base
//! `price` and an optional `discount_price`.

use rust_decimal::{Decimal, RoundingStrategy};

/// Display suffix for the shop currency.
pub const CURRENCY_SUFFIX: &str = "LE";

/// Resolve the price actually charged.
///
/// A discount price applies only when present and strictly positive; a zero
/// or negative discount falls back to the base price.
#[must_use]
pub fn effective_price(price: Decimal, discount_price: Option<Decimal>) -> Decimal {
    match discount_price {
        Some(discount) if discount > Decimal::ZERO => discount,
        _ => price,
    }
}

/// Format an amount for display, e.g. `1,600 LE` or `99.50 LE`.
///
/// Whole amounts are shown without decimals; fractional amounts are rounded
/// to two places.
#[must_use]
pub fn format_price(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let abs = rounded.abs();

    let whole = abs.trunc();
    let fraction = abs - whole;

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&group_thousands(&whole.to_string()));
    if !fraction.is_zero() {
        // "0.5" -> "50", "0.25" -> "25"
        let cents = (fraction * Decimal::ONE_HUNDRED).trunc().to_string();
        out.push_str(&format!(".{cents:0>2}"));
    }
    out.push(' ');
    out.push_str(CURRENCY_SUFFIX);
    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_price_uses_positive_discount() {
        assert_eq!(
            effective_price(Decimal::from(1000), Some(Decimal::from(800))),
            Decimal::from(800)
        );
    }

    #[test]
    fn test_effective_price_ignores_missing_or_zero_discount() {
        assert_eq!(effective_price(Decimal::from(1000), None), Decimal::from(1000));
        assert_eq!(
            effective_price(Decimal::from(1000), Some(Decimal::ZERO)),
            Decimal::from(1000)
        );
        assert_eq!(
            effective_price(Decimal::from(1000), Some(Decimal::from(-5))),
            Decimal::from(1000)
        );
    }

    #[test]
    fn test_format_price_groups_thousands() {
        assert_eq!(format_price(Decimal::from(1600)), "1,600 LE");
        assert_eq!(format_price(Decimal::from(1_234_567)), "1,234,567 LE");
        assert_eq!(format_price(Decimal::from(999)), "999 LE");
        assert_eq!(format_price(Decimal::ZERO), "0 LE");
    }

    #[test]
    fn test_format_price_fractional() {
        assert_eq!(format_price(Decimal::new(9950, 2)), "99.50 LE");
        assert_eq!(format_price(Decimal::new(100_005, 3)), "100.01 LE");
    }

    #[test]
    fn test_format_price_negative() {
        assert_eq!(format_price(Decimal::from(-400)), "-400 LE");
    }
}
