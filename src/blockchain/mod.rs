// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain integration module for EVM chains.
//!
//! This module provides functionality for:
//! - Querying native balances
//! - Gas estimation, nonce lookup and fee data
//! - Transaction signing and broadcasting with the server key
//! - Decimal <-> base-unit conversion

pub mod client;
#[cfg(test)]
pub mod mock;
pub mod signing;
pub mod types;
pub mod units;

pub use client::{parse_address, ChainClient, ChainClientError, EvmChainClient};
pub use signing::{load_signer, KeyError};
pub use types::*;
pub use units::{format_ether, parse_ether, AmountError};
