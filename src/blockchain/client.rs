// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EVM chain client for blockchain interactions.
//!
//! [`ChainClient`] is the seam between the HTTP service and the node: the
//! production implementation is [`EvmChainClient`] (alloy over HTTP JSON-RPC)
//! and tests substitute an in-memory mock.

use std::str::FromStr;

use alloy::{
    network::{Ethereum, EthereumWallet, TransactionBuilder},
    primitives::{Address, U256},
    providers::{
        fillers::{
            BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller,
            WalletFiller,
        },
        Identity, Provider, ProviderBuilder, RootProvider,
    },
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;

use super::signing::wallet_from_signer;
use super::types::{FeeData, SentTransaction, TransferTx};

/// HTTP provider type with all fillers plus the signing wallet.
type SigningProvider = FillProvider<
    JoinFill<
        JoinFill<
            Identity,
            JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
        >,
        WalletFiller<EthereumWallet>,
    >,
    RootProvider<Ethereum>,
>;

/// Operations the service needs from the chain.
///
/// Every method is a single network round-trip.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Address of the process's sole signing identity.
    fn sender_address(&self) -> Address;

    /// Balance of `address` in wei.
    async fn get_balance(&self, address: Address) -> Result<U256, ChainClientError>;

    /// Current fee data.
    async fn get_fee_data(&self) -> Result<FeeData, ChainClientError>;

    /// Gas required for a plain value transfer from the sender.
    async fn estimate_gas(&self, to: Address, value: U256) -> Result<u64, ChainClientError>;

    /// Transaction count of `address` including not-yet-mined transactions.
    async fn get_pending_nonce(&self, address: Address) -> Result<u64, ChainClientError>;

    /// Sign `tx` with the sender key and broadcast it.
    async fn send_transaction(&self, tx: TransferTx) -> Result<SentTransaction, ChainClientError>;

    /// Latest block number; used as a liveness check of the RPC endpoint.
    async fn get_block_number(&self) -> Result<u64, ChainClientError>;
}

/// Parse an address without enforcing the mixed-case checksum.
///
/// The `0x` prefix is optional; exactly 40 hex digits are required.
///
/// # Arguments
/// * `address` - Address text as received from a client
///
/// # Returns
/// * `Ok(Address)` - The parsed 20-byte address
/// * `Err(ChainClientError::InvalidAddress)` - If the text is not an address
pub fn parse_address(address: &str) -> Result<Address, ChainClientError> {
    Address::from_str(address).map_err(|e| ChainClientError::InvalidAddress(e.to_string()))
}

/// EVM client over HTTP JSON-RPC, holding the single signing wallet.
pub struct EvmChainClient {
    sender: Address,
    provider: SigningProvider,
}

impl EvmChainClient {
    /// Create a new client for `rpc_url`, signing with `signer`.
    ///
    /// No network request is made here; an unreachable endpoint only shows
    /// up on the first call.
    ///
    /// # Arguments
    /// * `rpc_url` - HTTP(S) JSON-RPC endpoint
    /// * `signer` - The server's signing key
    ///
    /// # Returns
    /// * `Ok(EvmChainClient)` - Client bound to the signer's address
    /// * `Err(ChainClientError::InvalidRpcUrl)` - If `rpc_url` does not parse
    pub fn new(rpc_url: &str, signer: PrivateKeySigner) -> Result<Self, ChainClientError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| ChainClientError::InvalidRpcUrl(e.to_string()))?;

        let sender = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(wallet_from_signer(signer))
            .connect_http(url);

        Ok(Self { sender, provider })
    }

    /// Chain ID reported by the endpoint.
    pub async fn chain_id(&self) -> Result<u64, ChainClientError> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| ChainClientError::RpcError(e.to_string()))
    }
}

#[async_trait]
impl ChainClient for EvmChainClient {
    fn sender_address(&self) -> Address {
        self.sender
    }

    async fn get_balance(&self, address: Address) -> Result<U256, ChainClientError> {
        self.provider
            .get_balance(address)
            .await
            .map_err(|e| ChainClientError::RpcError(e.to_string()))
    }

    async fn get_fee_data(&self) -> Result<FeeData, ChainClientError> {
        let gas_price = self
            .provider
            .get_gas_price()
            .await
            .map_err(|e| ChainClientError::RpcError(format!("Failed to get gas price: {}", e)))?;

        Ok(FeeData {
            gas_price: Some(gas_price),
        })
    }

    async fn estimate_gas(&self, to: Address, value: U256) -> Result<u64, ChainClientError> {
        let tx = TransactionRequest::default()
            .with_from(self.sender)
            .with_to(to)
            .with_value(value);

        self.provider
            .estimate_gas(tx)
            .await
            .map_err(|e| ChainClientError::RpcError(format!("Gas estimation failed: {}", e)))
    }

    async fn get_pending_nonce(&self, address: Address) -> Result<u64, ChainClientError> {
        self.provider
            .get_transaction_count(address)
            .pending()
            .await
            .map_err(|e| ChainClientError::RpcError(format!("Failed to get nonce: {}", e)))
    }

    async fn send_transaction(&self, tx: TransferTx) -> Result<SentTransaction, ChainClientError> {
        let request = TransactionRequest::default()
            .with_from(self.sender)
            .with_to(tx.to)
            .with_value(tx.value)
            .with_gas_limit(tx.gas_limit)
            .with_nonce(tx.nonce)
            .with_gas_price(tx.gas_price);

        let pending = self
            .provider
            .send_transaction(request)
            .await
            .map_err(|e| ChainClientError::TransactionFailed(format!("Failed to send: {}", e)))?;

        Ok(SentTransaction {
            tx_hash: format!("{:?}", pending.tx_hash()),
        })
    }

    async fn get_block_number(&self) -> Result<u64, ChainClientError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| ChainClientError::RpcError(e.to_string()))
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainClientError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::signing::signer_from_hex;

    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_parse_address() {
        let expected = parse_address("0x742d35Cc6634C0532925a3b844Bc9e7595f4aB12").unwrap();
        // Checksum is not enforced
        assert_eq!(
            parse_address("0x742D35CC6634c0532925a3b844bc9e7595f4ab12").unwrap(),
            expected
        );
        assert_eq!(
            parse_address("742d35cc6634c0532925a3b844bc9e7595f4ab12").unwrap(),
            expected
        );

        for bad in [
            "",
            "0x742d35cc6634c0532925a3b844bc9e7595f4ab1",
            "0x742d35cc6634c0532925a3b844bc9e7595f4ab123",
            "0xZZ2d35cc6634c0532925a3b844bc9e7595f4ab12",
            "127.0.0.1",
        ] {
            assert!(
                matches!(parse_address(bad), Err(ChainClientError::InvalidAddress(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_new_rejects_bad_rpc_url() {
        let signer = signer_from_hex(DEV_KEY).unwrap();
        assert!(matches!(
            EvmChainClient::new("not a url", signer),
            Err(ChainClientError::InvalidRpcUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_new_exposes_signer_address() {
        let signer = signer_from_hex(DEV_KEY).unwrap();
        let expected = signer.address();
        let client = EvmChainClient::new("http://127.0.0.1:8545", signer).unwrap();
        assert_eq!(client.sender_address(), expected);
    }
}
