//! Network capability boundary.
//!
//! Orchestration code never talks to an RPC endpoint directly; it goes
//! through [`ChainClient`] so the flows can run against a real node or a
//! test double.

use std::sync::Arc;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    account::Account, commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey,
    signature::Signature, transaction::Transaction,
};

use crate::error::{Error, Result};

/// Read-only account access plus transaction submission and confirmation.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn account(&self, pubkey: &Pubkey) -> Result<Option<Account>>;
    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<u64>;
    async fn latest_blockhash(&self) -> Result<Hash>;
    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature>;
    /// Whether the signature has reached `confirmed` commitment.
    async fn confirm_signature(&self, signature: &Signature) -> Result<bool>;
}

#[async_trait]
impl ChainClient for RpcClient {
    async fn account(&self, pubkey: &Pubkey) -> Result<Option<Account>> {
        self.get_account_with_commitment(pubkey, CommitmentConfig::confirmed())
            .await
            .map(|response| response.value)
            .map_err(Error::from)
    }

    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<u64> {
        self.get_minimum_balance_for_rent_exemption(data_len)
            .await
            .map_err(Error::from)
    }

    async fn latest_blockhash(&self) -> Result<Hash> {
        self.get_latest_blockhash().await.map_err(Error::from)
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature> {
        RpcClient::send_transaction(self, transaction)
            .await
            .map_err(Error::from)
    }

    async fn confirm_signature(&self, signature: &Signature) -> Result<bool> {
        self.confirm_transaction_with_commitment(signature, CommitmentConfig::confirmed())
            .await
            .map(|response| response.value)
            .map_err(Error::from)
    }
}

#[async_trait]
impl<T: ChainClient + ?Sized> ChainClient for Arc<T> {
    async fn account(&self, pubkey: &Pubkey) -> Result<Option<Account>> {
        (**self).account(pubkey).await
    }

    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<u64> {
        (**self).minimum_balance_for_rent_exemption(data_len).await
    }

    async fn latest_blockhash(&self) -> Result<Hash> {
        (**self).latest_blockhash().await
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature> {
        (**self).send_transaction(transaction).await
    }

    async fn confirm_signature(&self, signature: &Signature) -> Result<bool> {
        (**self).confirm_signature(signature).await
    }
}
