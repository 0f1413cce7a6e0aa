//! Associated-token-account existence checks.
//!
//! A create instruction is only ever issued for an account classified as
//! `NotFound`; an account that already exists with the right mint is reused
//! as-is, keeping the "ensure account" steps idempotent.

use solana_program::program_pack::Pack;
use solana_sdk::pubkey::Pubkey;
use spl_token::state::Account as TokenAccount;

use crate::{
    error::{Error, Result},
    rpc::ChainClient,
};

/// What a candidate token-account address holds on chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenAccountStatus {
    /// No account stored at the address.
    NotFound,
    /// Stored bytes are not a token account.
    WrongLayout,
    /// A token account, but for a different mint.
    MintMismatch,
    /// A token account bound to the expected mint.
    Exists,
}

impl TokenAccountStatus {
    pub fn exists(&self) -> bool {
        matches!(self, Self::Exists)
    }
}

/// Classifies raw stored bytes against the expected mint.
pub fn classify_token_account(
    data: Option<&[u8]>,
    expected_mint: &Pubkey,
) -> Result<TokenAccountStatus> {
    let Some(data) = data else {
        return Ok(TokenAccountStatus::NotFound);
    };
    if data.len() != TokenAccount::LEN {
        return Ok(TokenAccountStatus::WrongLayout);
    }
    let account = TokenAccount::unpack_from_slice(data).map_err(|_| Error::InvalidAccountData)?;
    if account.mint != *expected_mint {
        return Ok(TokenAccountStatus::MintMismatch);
    }
    Ok(TokenAccountStatus::Exists)
}

/// Fetches an account and classifies it against the expected mint.
pub async fn token_account_status<C: ChainClient + ?Sized>(
    chain: &C,
    address: &Pubkey,
    expected_mint: &Pubkey,
) -> Result<TokenAccountStatus> {
    let account = chain.account(address).await?;
    classify_token_account(account.as_ref().map(|a| a.data.as_slice()), expected_mint)
}
