// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory [`ChainClient`] for tests.
//!
//! Records every call in order so tests can assert which network steps ran.
//! Broadcasting advances the pending nonce like a node's mempool would.

use std::{
    sync::Mutex,
    time::Duration,
};

use alloy::primitives::{address, Address, U256};
use async_trait::async_trait;

use super::client::{ChainClient, ChainClientError};
use super::types::{FeeData, SentTransaction, TransferTx};

pub const MOCK_SENDER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

/// A recorded chain call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainCall {
    Balance,
    FeeData,
    EstimateGas,
    PendingNonce,
    SendTransaction,
    BlockNumber,
}

pub struct MockChainClient {
    balance: U256,
    gas_price: Option<u128>,
    gas_limit: u64,
    failing: Vec<ChainCall>,
    delayed: Option<(ChainCall, Duration)>,
    pending_nonce: Mutex<u64>,
    calls: Mutex<Vec<ChainCall>>,
    sent: Mutex<Vec<TransferTx>>,
}

impl Default for MockChainClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChainClient {
    pub fn new() -> Self {
        Self {
            balance: U256::ZERO,
            gas_price: Some(3_000_000_000),
            gas_limit: 21_000,
            failing: Vec::new(),
            delayed: None,
            pending_nonce: Mutex::new(0),
            calls: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn with_balance(mut self, wei: U256) -> Self {
        self.balance = wei;
        self
    }

    pub fn with_gas_price(mut self, gas_price: Option<u128>) -> Self {
        self.gas_price = gas_price;
        self
    }

    pub fn with_nonce(self, nonce: u64) -> Self {
        *self.pending_nonce.lock().unwrap() = nonce;
        self
    }

    /// Make `call` return an RPC error.
    pub fn failing(mut self, call: ChainCall) -> Self {
        self.failing.push(call);
        self
    }

    /// Make `call` stall for `delay` before answering.
    pub fn delayed(mut self, call: ChainCall, delay: Duration) -> Self {
        self.delayed = Some((call, delay));
        self
    }

    pub fn calls(&self) -> Vec<ChainCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<TransferTx> {
        self.sent.lock().unwrap().clone()
    }

    async fn enter(&self, call: ChainCall) -> Result<(), ChainClientError> {
        self.calls.lock().unwrap().push(call);

        if let Some((delayed, delay)) = self.delayed {
            if delayed == call {
                tokio::time::sleep(delay).await;
            }
        }

        // Give concurrent requests a chance to interleave at every step.
        tokio::task::yield_now().await;

        if self.failing.contains(&call) {
            return Err(ChainClientError::RpcError(format!(
                "mock {:?} failure <script>alert(1)</script>",
                call
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    fn sender_address(&self) -> Address {
        MOCK_SENDER
    }

    async fn get_balance(&self, _address: Address) -> Result<U256, ChainClientError> {
        self.enter(ChainCall::Balance).await?;
        Ok(self.balance)
    }

    async fn get_fee_data(&self) -> Result<FeeData, ChainClientError> {
        self.enter(ChainCall::FeeData).await?;
        Ok(FeeData {
            gas_price: self.gas_price,
        })
    }

    async fn estimate_gas(&self, _to: Address, _value: U256) -> Result<u64, ChainClientError> {
        self.enter(ChainCall::EstimateGas).await?;
        Ok(self.gas_limit)
    }

    async fn get_pending_nonce(&self, _address: Address) -> Result<u64, ChainClientError> {
        self.enter(ChainCall::PendingNonce).await?;
        Ok(*self.pending_nonce.lock().unwrap())
    }

    async fn send_transaction(&self, tx: TransferTx) -> Result<SentTransaction, ChainClientError> {
        self.enter(ChainCall::SendTransaction).await?;

        let mut pending = self.pending_nonce.lock().unwrap();
        if tx.nonce < *pending {
            return Err(ChainClientError::TransactionFailed(format!(
                "nonce too low: {} < {}",
                tx.nonce, *pending
            )));
        }
        *pending = tx.nonce + 1;

        let tx_hash = format!("0x{:064x}", tx.nonce + 1);
        self.sent.lock().unwrap().push(tx);
        Ok(SentTransaction { tx_hash })
    }

    async fn get_block_number(&self) -> Result<u64, ChainClientError> {
        self.enter(ChainCall::BlockNumber).await?;
        Ok(1)
    }
}
