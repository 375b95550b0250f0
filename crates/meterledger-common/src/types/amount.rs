//! Amount and flag handling
//!
//! Every amount crossing the ledger boundary is a [`Decimal`] at scale 6, so
//! `120.5` is persisted and rendered as `"120.500000"`. Parsing is strict:
//! malformed input is rejected instead of silently becoming zero.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::{MeterLedgerError, Result, AMOUNT_SCALE};

/// Parse a user-supplied decimal amount.
///
/// Accepts plain (`"120.5"`, `"-3"`) and scientific (`"1.5e3"`) notation.
/// Empty strings, NaN, infinities and anything else unparseable are an
/// [`MeterLedgerError::InvalidArgument`].
pub fn parse_amount(raw: &str) -> Result<Decimal> {
    if raw.is_empty() {
        return Err(MeterLedgerError::InvalidArgument(
            "amount must not be empty".to_string(),
        ));
    }

    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map(normalize_amount)
        .map_err(|_| MeterLedgerError::InvalidArgument(format!("'{}' is not a decimal amount", raw)))
}

/// Bring an amount to the ledger scale.
pub fn normalize_amount(value: Decimal) -> Decimal {
    let mut value = value;
    value.rescale(AMOUNT_SCALE);
    if value.is_zero() {
        // drops the sign of a negative zero
        return Decimal::new(0, AMOUNT_SCALE);
    }
    value
}

/// Render an amount with exactly six fractional digits.
pub fn format_amount(value: Decimal) -> String {
    format!("{:.1$}", normalize_amount(value), AMOUNT_SCALE as usize)
}

/// Parse a user-supplied boolean flag.
///
/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn parse_flag(raw: &str) -> Result<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(MeterLedgerError::InvalidArgument(format!(
            "'{}' is not a boolean (false/true)",
            raw
        ))),
    }
}
