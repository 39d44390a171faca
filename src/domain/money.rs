use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode, Zero};

use super::errors::DomainError;

/// Number of decimal digits kept for every stored or printed amount.
pub const MONEY_SCALE: i64 = 2;

/// Amounts must stay below `10^AMOUNT_DIGITS` once rounded to cents.
pub const AMOUNT_DIGITS: i64 = 12;

/// Most fractional digits accepted on input, trailing zeros aside.
pub const MAX_INPUT_SCALE: i64 = 6;

/// Parse a client-supplied amount and check it with [`check_amount`].
pub fn parse_amount(raw: &str) -> Result<BigDecimal, DomainError> {
    let value = BigDecimal::from_str(raw.trim())
        .map_err(|_| DomainError::InvalidInput(format!("'{}' is not a decimal number", raw)))?;
    check_amount(&value)?;
    Ok(value)
}

/// Reject amounts that cannot be stored as cents below `10^12`.
///
/// Only digit counts are inspected before rounding, so an input such as
/// `1e10000000` is refused without being expanded.
pub fn check_amount(value: &BigDecimal) -> Result<(), DomainError> {
    if value.is_zero() {
        return Ok(());
    }
    let normalized = value.normalized();
    let (_, scale) = normalized.as_bigint_and_exponent();
    if scale > MAX_INPUT_SCALE {
        return Err(DomainError::InvalidInput(format!(
            "amounts may have at most {} decimal places",
            MAX_INPUT_SCALE
        )));
    }
    let integer_digits = normalized.digits() as i64 - scale;
    if integer_digits > AMOUNT_DIGITS || amount_limit_exceeded(&normalized) {
        return Err(DomainError::InvalidInput(format!(
            "amounts must be below 10^{}",
            AMOUNT_DIGITS
        )));
    }
    Ok(())
}

/// Whether `value` rounds to `10^12` or more in magnitude. `value` must
/// already be bounded in digits.
pub fn amount_limit_exceeded(value: &BigDecimal) -> bool {
    round_money(value).abs() >= BigDecimal::new(1.into(), -AMOUNT_DIGITS)
}

/// Round to cents, half away from zero.
pub fn round_money(value: &BigDecimal) -> BigDecimal {
    value.with_scale_round(MONEY_SCALE, RoundingMode::HalfUp)
}

/// Format with exactly two decimal digits, e.g. `26` -> `"26.00"`.
pub fn format_money(value: &BigDecimal) -> String {
    let rounded = round_money(value);
    let (digits, scale) = rounded.as_bigint_and_exponent();
    debug_assert_eq!(scale, MONEY_SCALE);

    let negative = rounded < BigDecimal::from(0);
    let magnitude = digits.magnitude().to_string();
    let padded = format!("{:0>3}", magnitude);
    let (int_part, frac_part) = padded.split_at(padded.len() - MONEY_SCALE as usize);

    if negative {
        format!("-{}.{}", int_part, frac_part)
    } else {
        format!("{}.{}", int_part, frac_part)
    }
}
