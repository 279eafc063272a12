//! Utility functions for formatting money in reports
//!
//! This module provides centralized formatting utilities for consistent
//! display of currency and decimal values throughout the application.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round half away from zero to two places and format with a `.` decimal
/// separator, e.g. `1234.5` -> `"1234.50"`.
pub fn format_decimal(value: Decimal) -> String {
    format!(
        "{:.2}",
        value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

/// Format with a currency symbol using English conventions: `,` thousands
/// separator, `.` decimal separator, and the sign ahead of the symbol.
///
/// # Examples
/// ```
/// use orca::utils::format_currency;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_currency(dec!(1234.56), "$"), "$1,234.56");
/// assert_eq!(format_currency(dec!(-500), "฿"), "-฿500.00");
/// assert_eq!(format_currency(dec!(1234), ""), "1,234.00");
/// ```
pub fn format_currency(value: Decimal, symbol: &str) -> String {
    let formatted = format_decimal(value.abs());
    let (integer_part, decimal_part) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));

    // Add thousands separators (,) to integer part
    let with_separators: String = integer_part
        .chars()
        .rev()
        .enumerate()
        .flat_map(|(i, c)| {
            if i > 0 && i % 3 == 0 {
                vec![',', c]
            } else {
                vec![c]
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    // Values that round to zero never show a sign
    let is_negative = value.is_sign_negative() && formatted != "0.00";
    let sign = if is_negative { "-" } else { "" };

    format!("{}{}{}.{}", sign, symbol, with_separators, decimal_part)
}
