// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction submission for validated transfers.
//!
//! A transfer runs as a fixed pipeline of dependent network calls:
//!
//! ```text
//! balance -> fee data -> gas estimate -> pending nonce -> sign + broadcast
//! ```
//!
//! The first failing step aborts the rest. Every call is bounded by the
//! configured RPC timeout. Nothing is retried.
//!
//! ## Nonce serialization
//!
//! The pending-nonce read and the broadcast run under one lock per service.
//! Only one signing key exists per process, so this serializes nonce
//! assignment for the sender and concurrent transfers get consecutive nonces
//! instead of colliding.

use std::{future::Future, sync::Arc, time::Duration};

use alloy::primitives::{Address, U256};
use tokio::sync::Mutex;

use crate::blockchain::{
    format_ether, parse_address, ChainClient, ChainClientError, TransferTx,
};
use crate::validation::ValidatedTransfer;

/// Errors raised while executing a transfer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Insufficient balance.")]
    InsufficientBalance { balance: U256, requested: U256 },

    #[error("Gas estimation failed: {0}")]
    GasEstimationFailed(String),

    #[error("Nonce lookup failed: {0}")]
    NonceUnavailable(String),

    #[error("Broadcast failed: {0}")]
    BroadcastFailed(String),
}

impl TransferError {
    /// Whether the caller caused the failure (as opposed to the provider).
    pub fn is_client_error(&self) -> bool {
        matches!(self, TransferError::InsufficientBalance { .. })
    }
}

/// Errors raised by a balance query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BalanceError {
    #[error("Invalid Ethereum address.")]
    InvalidAddress,

    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),
}

/// Successful broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub tx_hash: String,
    pub nonce: u64,
}

/// Balance of an account, in ether.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountBalance {
    pub address: String,
    pub balance: String,
}

/// Executes transfers and balance lookups against a [`ChainClient`].
pub struct TransferService {
    client: Arc<dyn ChainClient>,
    rpc_timeout: Duration,
    nonce_lock: Mutex<()>,
}

impl TransferService {
    pub fn new(client: Arc<dyn ChainClient>, rpc_timeout: Duration) -> Self {
        Self {
            client,
            rpc_timeout,
            nonce_lock: Mutex::new(()),
        }
    }

    /// Address of the signing identity.
    pub fn sender(&self) -> Address {
        self.client.sender_address()
    }

    /// Submit a validated transfer from the server's account.
    pub async fn submit_transfer(
        &self,
        transfer: &ValidatedTransfer,
    ) -> Result<TransferReceipt, TransferError> {
        let sender = self.sender();
        let to = transfer.recipient;
        let value = transfer.amount_wei;

        let balance = self
            .bounded(self.client.get_balance(sender))
            .await
            .map_err(TransferError::ProviderUnavailable)?;

        tracing::info!(
            sender = %sender,
            balance = %format_ether(balance),
            requested = %transfer.amount,
            "Sender balance"
        );

        if value > balance {
            return Err(TransferError::InsufficientBalance {
                balance,
                requested: value,
            });
        }

        let fee_data = self
            .bounded(self.client.get_fee_data())
            .await
            .map_err(TransferError::ProviderUnavailable)?;
        let gas_price = fee_data.effective_gas_price();

        let gas_limit = self
            .bounded(self.client.estimate_gas(to, value))
            .await
            .map_err(TransferError::GasEstimationFailed)?;

        // Held until the broadcast completes so no other transfer can read
        // the same pending nonce.
        let _guard = self.nonce_lock.lock().await;

        let nonce = self
            .bounded(self.client.get_pending_nonce(sender))
            .await
            .map_err(TransferError::NonceUnavailable)?;

        let tx = TransferTx {
            to,
            value,
            gas_limit,
            nonce,
            gas_price,
        };

        tracing::debug!(
            to = %to,
            value = %value,
            gas_limit,
            gas_price = %gas_price,
            nonce,
            "Broadcasting transfer"
        );

        let sent = self
            .bounded(self.client.send_transaction(tx))
            .await
            .map_err(TransferError::BroadcastFailed)?;

        tracing::info!(tx_hash = %sent.tx_hash, nonce, "Transaction sent");

        Ok(TransferReceipt {
            tx_hash: sent.tx_hash,
            nonce,
        })
    }

    /// Fetch the balance of `address`.
    pub async fn get_account_balance(&self, address: &str) -> Result<AccountBalance, BalanceError> {
        let parsed = parse_address(address).map_err(|_| BalanceError::InvalidAddress)?;

        let balance = self
            .bounded(self.client.get_balance(parsed))
            .await
            .map_err(BalanceError::ProviderUnavailable)?;

        Ok(AccountBalance {
            address: address.to_string(),
            balance: format_ether(balance),
        })
    }

    /// Whether the RPC endpoint answers within the timeout.
    pub async fn provider_reachable(&self) -> bool {
        self.bounded(self.client.get_block_number()).await.is_ok()
    }

    /// Apply the RPC timeout to one chain call and flatten its error.
    async fn bounded<T, F>(&self, call: F) -> Result<T, String>
    where
        F: Future<Output = Result<T, ChainClientError>>,
    {
        match tokio::time::timeout(self.rpc_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!(
                "RPC call timed out after {}ms",
                self.rpc_timeout.as_millis()
            )),
        }
    }
}
