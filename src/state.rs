//! On-chain escrow account layout.
//!
//! The escrow program owns this account; the client only ever reads it to
//! learn the initializer-side addresses an `Exchange` must reference.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::pubkey::Pubkey;

use crate::{
    error::{Error, Result},
    rpc::ChainClient,
};

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq)]
pub struct EscrowAccount {
    pub initializer_key: Pubkey,
    pub initializer_deposit_token_account: Pubkey,
    pub initializer_receive_wallet_account: Pubkey,
    pub initializer_amount: u64,
    pub taker_amount: u64,
}

impl EscrowAccount {
    pub const LEN: usize = 32 // initializer_key
        + 32 // initializer_deposit_token_account
        + 32 // initializer_receive_wallet_account
        + 8 // initializer_amount
        + 8; // taker_amount

    /// Decodes the fixed-size layout from raw stored bytes.
    pub fn unpack(data: &[u8]) -> Result<Self> {
        if data.len() < Self::LEN {
            return Err(Error::InvalidAccountData);
        }
        Self::try_from_slice(&data[..Self::LEN]).map_err(|_| Error::InvalidAccountData)
    }
}

/// Fetches and decodes the escrow account backing an offer.
pub async fn fetch_escrow_account<C: ChainClient + ?Sized>(
    chain: &C,
    escrow_address: &Pubkey,
) -> Result<EscrowAccount> {
    let account = chain
        .account(escrow_address)
        .await?
        .ok_or(Error::AccountNotFound)?;
    EscrowAccount::unpack(&account.data)
}
