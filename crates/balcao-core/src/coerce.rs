//! # Input Coercion
//!
//! Turns operator-typed text into fixed-point values.
//!
//! ## Two Policies
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  coerce_*  (permissive)              parse_*  (strict)                 │
//! │  ─────────────────────               ─────────────────                 │
//! │  "12,5"   → 12,50                    "12,5"   → Ok(12,50)              │
//! │  "abc"    → 0                        "abc"    → Err(InvalidFormat)     │
//! │  "-3"     → 0                        "-3"     → Err(MustBePositive)    │
//! │  ""       → 0                        ""       → Err(Required)          │
//! │                                                                         │
//! │  Used on every edit so a half-typed   Used by callers that validate    │
//! │  value never blocks the operator.     once, on blur or on submit.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Accepted Formats
//! - `1234`, `1234.5`, `1234,56`
//! - `1.234,56` / `1,234.56` (last separator is the decimal one)
//! - optional `R$` prefix and `%` suffix
//! - extra fraction digits are rounded half up
//!
//! ## Largest Value
//! Both policies stop at [`MAX_WHOLE`] whole units (99.999.999,99 for money,
//! the backend's ten-digit decimal columns). Above it, `coerce_*` gives zero
//! and `parse_*` returns `OutOfRange`.

use tracing::debug;

use crate::error::ValidationError;
use crate::money::{Money, Quantity, Rate};

/// Largest whole part an operator may type into any numeric field.
pub const MAX_WHOLE: i64 = 99_999_999;

/// Whether a value parsed at `scale` fits under [`MAX_WHOLE`].
fn within_bounds(value: i64, scale: u32) -> bool {
    let factor = 10_i64.pow(scale);
    value.unsigned_abs() < (MAX_WHOLE as u64 + 1) * factor as u64
}

/// Parses decimal text into an integer with `scale` fraction digits.
///
/// Returns `None` for anything that is not a number. Negative numbers are
/// returned as-is; the policies below decide what to do with them.
pub fn parse_scaled(input: &str, scale: u32) -> Option<i64> {
    let mut text = input.trim();
    text = text.strip_prefix("R$").unwrap_or(text).trim();
    text = text.strip_suffix('%').unwrap_or(text).trim();

    let (negative, text) = match text.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, text),
    };
    if text.is_empty() {
        return None;
    }

    let (int_part, frac_part) = split_decimal(text)?;
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let factor = 10_i64.checked_pow(scale)?;
    let mut value: i64 = if int_part.is_empty() {
        0
    } else {
        int_part.parse::<i64>().ok()?.checked_mul(factor)?
    };

    let frac_bytes = frac_part.as_bytes();
    let mut place = factor;
    for i in 0..scale as usize {
        place /= 10;
        let digit = frac_bytes.get(i).map(|b| (b - b'0') as i64).unwrap_or(0);
        value = value.checked_add(digit * place)?;
    }
    // Round half up on the first dropped digit
    if let Some(next) = frac_bytes.get(scale as usize) {
        if *next >= b'5' {
            value = value.checked_add(1)?;
        }
    }

    Some(if negative { -value } else { value })
}

/// Splits on the decimal separator, removing thousands separators.
fn split_decimal(text: &str) -> Option<(String, &str)> {
    let last_dot = text.rfind('.');
    let last_comma = text.rfind(',');

    let decimal_at = match (last_dot, last_comma) {
        (None, None) => return Some((text.to_string(), "")),
        (Some(d), None) => {
            // "1.234.567" has no unambiguous decimal separator
            if text.matches('.').count() > 1 {
                return None;
            }
            d
        }
        (None, Some(c)) => {
            if text.matches(',').count() > 1 {
                return None;
            }
            c
        }
        (Some(d), Some(c)) => d.max(c),
    };

    let (int_raw, frac_with_sep) = text.split_at(decimal_at);
    let frac = &frac_with_sep[1..];
    if frac.contains(['.', ',']) {
        return None;
    }
    let int_part: String = int_raw.chars().filter(|c| *c != '.' && *c != ',').collect();
    Some((int_part, frac))
}

// =============================================================================
// Permissive Policy
// =============================================================================

fn coerce_scaled(raw: &str, scale: u32) -> i64 {
    match parse_scaled(raw, scale) {
        Some(v) if v >= 0 && within_bounds(v, scale) => v,
        Some(v) if v >= 0 => {
            debug!(input = %raw, value = v, "Input above the largest value coerced to zero");
            0
        }
        Some(v) => {
            debug!(input = %raw, value = v, "Negative input coerced to zero");
            0
        }
        None => {
            debug!(input = %raw, "Unparseable input coerced to zero");
            0
        }
    }
}

/// Permissive money parse: failure or negative → zero.
pub fn coerce_money(raw: &str) -> Money {
    Money::from_cents(coerce_scaled(raw, 2))
}

/// Permissive quantity parse: failure or negative → zero.
pub fn coerce_quantity(raw: &str) -> Quantity {
    Quantity::from_thousandths(coerce_scaled(raw, 3))
}

/// Permissive percentage parse ("2,5" → 250 bps): failure or negative → zero.
pub fn coerce_rate(raw: &str) -> Rate {
    let bps = coerce_scaled(raw, 2);
    Rate::from_bps(u32::try_from(bps).unwrap_or(u32::MAX))
}

/// Permissive parse to hundredths, the storage unit of an order discount
/// (cents in amount mode, basis points in percentage mode).
pub fn coerce_hundredths(raw: &str) -> i64 {
    coerce_scaled(raw, 2)
}

// =============================================================================
// Strict Policy
// =============================================================================

fn parse_non_negative(field: &str, raw: &str, scale: u32) -> Result<i64, ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    match parse_scaled(raw, scale) {
        Some(v) if v >= 0 && within_bounds(v, scale) => Ok(v),
        Some(v) if v >= 0 => Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_WHOLE,
        }),
        Some(_) => Err(ValidationError::MustBePositive {
            field: field.to_string(),
        }),
        None => Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("'{}' is not a number", raw.trim()),
        }),
    }
}

/// Strict money parse for parse-on-submit flows.
pub fn parse_money(field: &str, raw: &str) -> Result<Money, ValidationError> {
    parse_non_negative(field, raw, 2).map(Money::from_cents)
}

/// Strict quantity parse; zero is rejected.
pub fn parse_quantity(field: &str, raw: &str) -> Result<Quantity, ValidationError> {
    let value = parse_non_negative(field, raw, 3)?;
    if value == 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(Quantity::from_thousandths(value))
}

/// Strict percentage parse, capped at 100%.
pub fn parse_rate(field: &str, raw: &str) -> Result<Rate, ValidationError> {
    let bps = parse_non_negative(field, raw, 2)?;
    if bps > Rate::SCALE as i64 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 100,
        });
    }
    Ok(Rate::from_bps(bps as u32))
}

// =============================================================================
// Unit Tests
// =============================================================================
