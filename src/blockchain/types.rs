// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types and constants.

use alloy::primitives::{Address, U256};

/// Decimals of the chain's native currency (1 ether = 10^18 wei).
pub const ETHER_DECIMALS: u8 = 18;

/// Gas price used when the provider reports none (2 gwei).
pub const DEFAULT_GAS_PRICE_WEI: u128 = 2_000_000_000;

/// Current fee data reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeData {
    /// Legacy gas price in wei, if the provider reported one.
    pub gas_price: Option<u128>,
}

impl FeeData {
    /// Gas price to attach to a transaction.
    ///
    /// A missing or zero price falls back to [`DEFAULT_GAS_PRICE_WEI`].
    pub fn effective_gas_price(&self) -> u128 {
        self.gas_price
            .filter(|price| *price > 0)
            .unwrap_or(DEFAULT_GAS_PRICE_WEI)
    }
}

/// A fully-determined native transfer, ready for signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferTx {
    pub to: Address,
    /// Value in wei
    pub value: U256,
    pub gas_limit: u64,
    pub nonce: u64,
    /// Gas price in wei
    pub gas_price: u128,
}

/// Transaction send result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentTransaction {
    /// Transaction hash (0x-prefixed hex)
    pub tx_hash: String,
}
