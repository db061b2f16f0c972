// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Conversion between human-readable decimal amounts and base-unit integers.
//!
//! All arithmetic is done on [`U256`] so that amounts and balances compare
//! exactly; nothing passes through floating point.

use alloy::primitives::U256;

use super::types::ETHER_DECIMALS;

/// Errors produced while parsing a decimal amount.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount is empty")]
    Empty,

    #[error("Invalid amount format")]
    InvalidFormat,

    #[error("Too many decimal places (max {0})")]
    TooManyDecimals(u8),

    #[error("Amount overflow")]
    Overflow,
}

/// Parse a human-readable, unsigned decimal amount into base units.
///
/// Accepts `"1"`, `"1.5"` and `".5"`. Signs, exponents, whitespace and a
/// trailing `.` are rejected.
fn parse_amount(amount: &str, decimals: u8) -> Result<U256, AmountError> {
    if amount.is_empty() {
        return Err(AmountError::Empty);
    }

    let (whole, fraction) = match amount.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (amount, None),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) {
        return Err(AmountError::InvalidFormat);
    }

    let fraction = match fraction {
        Some(f) if f.is_empty() || !all_digits(f) => return Err(AmountError::InvalidFormat),
        Some(f) => f,
        None if whole.is_empty() => return Err(AmountError::InvalidFormat),
        None => "",
    };

    if fraction.len() > decimals as usize {
        return Err(AmountError::TooManyDecimals(decimals));
    }

    let whole = if whole.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(whole, 10).map_err(|_| AmountError::Overflow)?
    };

    // Pad with zeros to match decimals
    let padded = format!("{:0<width$}", fraction, width = decimals as usize);
    let fraction = if padded.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(&padded, 10).map_err(|_| AmountError::Overflow)?
    };

    let multiplier = U256::from(10u64).pow(U256::from(decimals));
    whole
        .checked_mul(multiplier)
        .and_then(|w| w.checked_add(fraction))
        .ok_or(AmountError::Overflow)
}

/// Format base units as a decimal string.
///
/// Always carries at least one fractional digit (`"1.0"`, `"0.0"`) and never
/// truncates precision.
fn format_amount(amount: U256, decimals: u8) -> String {
    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = amount / divisor;
    let remainder = amount % divisor;

    if remainder.is_zero() {
        return format!("{}.0", whole);
    }

    let decimal_str = format!("{:0>width$}", remainder, width = decimals as usize);
    format!("{}.{}", whole, decimal_str.trim_end_matches('0'))
}

/// Parse an ether amount into wei.
///
/// Up to 18 fractional digits are accepted; more is an error rather than a
/// silent truncation.
///
/// # Arguments
/// * `amount` - Unsigned decimal text, e.g. `"1.5"` or `".25"`
///
/// # Returns
/// * `Ok(U256)` - The amount in wei
/// * `Err(AmountError)` - If the text is empty, malformed, too precise or
///   does not fit in 256 bits
pub fn parse_ether(amount: &str) -> Result<U256, AmountError> {
    parse_amount(amount, ETHER_DECIMALS)
}

/// Format wei as an ether amount.
///
/// # Arguments
/// * `wei` - Amount in wei
///
/// # Returns
/// Decimal text with trailing zeros trimmed but at least one fractional
/// digit, e.g. `"0.75"` or `"2.0"`
pub fn format_ether(wei: U256) -> String {
    format_amount(wei, ETHER_DECIMALS)
}
