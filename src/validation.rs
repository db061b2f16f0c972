// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Transfer Input Validation
//!
//! Normalizes and checks the recipient address and transfer amount before
//! any chain interaction. Everything here is pure: no I/O, no state.
//!
//! ## Check Order
//!
//! 1. Trim and HTML-escape both fields
//! 2. Recipient must be a syntactically valid address
//! 3. Amount must be present, numeric and non-negative
//! 4. Strip markup from both fields again
//! 5. Recipient must not contain denylisted characters
//! 6. Recipient must not look like a private/loopback IPv4 address
//!
//! The first failing check wins.
//!
//! ## Known Limitations
//!
//! [`has_unsafe_characters`] and [`looks_like_internal_ip`] are textual
//! heuristics. The IP check only matches the leading octet (`127.`, `10.`,
//! `172.`, `192.`): it knows nothing about CIDR ranges or IPv6. Both are kept
//! as standalone predicates so their behavior can be tested directly.

use alloy::primitives::{Address, U256};

use crate::blockchain::{parse_address, parse_ether};

/// Characters rejected in a recipient regardless of address validity.
pub const UNSAFE_CHARACTERS: &[char] = &['$', '{', '}', ';', '&', '=', '\'', '"'];

/// Leading octets treated as internal addresses.
pub const INTERNAL_IP_PREFIXES: &[&str] = &["127.", "10.", "172.", "192."];

/// Reasons a transfer request is rejected before touching the network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid recipient address.")]
    InvalidRecipient,

    #[error("Amount is required.")]
    MissingAmount,

    #[error("Invalid transfer amount.")]
    InvalidAmount,

    #[error("Invalid characters in recipient address.")]
    UnsafeCharacters,

    #[error("SSRF attempt detected.")]
    SsrfSuspected,
}

/// Transfer inputs that passed every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTransfer {
    pub recipient: Address,
    /// Sanitized decimal amount as submitted
    pub amount: String,
    /// Amount in wei
    pub amount_wei: U256,
}

/// Validate and sanitize a transfer request.
pub fn validate_transfer(
    raw_recipient: &str,
    raw_amount: &str,
) -> Result<ValidatedTransfer, ValidationError> {
    let recipient = escape_html(raw_recipient.trim());
    let amount = escape_html(raw_amount.trim());

    let address = parse_address(&recipient).map_err(|_| ValidationError::InvalidRecipient)?;
    let amount_wei = validate_amount(&amount)?;

    let recipient = strip_tags(&recipient);
    let amount = strip_tags(&amount);

    if has_unsafe_characters(&recipient) {
        return Err(ValidationError::UnsafeCharacters);
    }

    if looks_like_internal_ip(&recipient) {
        return Err(ValidationError::SsrfSuspected);
    }

    Ok(ValidatedTransfer {
        recipient: address,
        amount,
        amount_wei,
    })
}

/// Check that `amount` is a non-negative decimal and convert it to wei.
pub fn validate_amount(amount: &str) -> Result<U256, ValidationError> {
    if !is_numeric(amount) {
        return Err(ValidationError::MissingAmount);
    }

    if amount.starts_with('-') {
        return Err(ValidationError::InvalidAmount);
    }

    let unsigned = amount.strip_prefix('+').unwrap_or(amount);
    parse_ether(unsigned).map_err(|_| ValidationError::InvalidAmount)
}

/// Optionally signed decimal number: `[+-]?(digits*.)?digits+`.
pub fn is_numeric(value: &str) -> bool {
    let unsigned = value
        .strip_prefix('+')
        .or_else(|| value.strip_prefix('-'))
        .unwrap_or(value);

    let digits = match unsigned.split_once('.') {
        Some((whole, fraction)) => {
            if !whole.bytes().all(|b| b.is_ascii_digit()) {
                return false;
            }
            fraction
        }
        None => unsigned,
    };

    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Denylist check for characters that enable injection if the value is ever
/// interpolated into a query, template or shell.
pub fn has_unsafe_characters(value: &str) -> bool {
    value.contains(UNSAFE_CHARACTERS)
}

/// Textual private/loopback IPv4 prefix check.
pub fn looks_like_internal_ip(value: &str) -> bool {
    INTERNAL_IP_PREFIXES
        .iter()
        .any(|prefix| value.starts_with(prefix))
}

/// Replace HTML-significant characters with entities.
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            '/' => escaped.push_str("&#x2F;"),
            '\\' => escaped.push_str("&#x5C;"),
            '`' => escaped.push_str("&#96;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Remove anything that looks like a markup tag, plus control characters.
pub fn strip_tags(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_tag = false;
    for c in value.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

/// Make arbitrary (error) text safe to embed in a response rendered as HTML.
pub fn sanitize_for_display(value: &str) -> String {
    escape_html(&strip_tags(value))
}
