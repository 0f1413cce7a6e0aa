use std::time::Duration;

use solana_program::program_error::ProgramError;
use solana_sdk::{pubkey::ParsePubkeyError, signer::SignerError};

use crate::{account::TokenAccountStatus, store::OfferStatus};

/// Everything that can go wrong between a user action and a confirmed
/// on-chain outcome. Failures before any I/O (`Validation`) need a corrected
/// input; `SignerRejected` is a benign cancellation; after
/// `NotConfirmedWithinTimeout` the on-chain outcome is unknown and the offer
/// record must not be touched.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid offer input: {0}")]
    Validation(String),
    #[error("no valid bump seed for the escrow authority")]
    AddressDerivation,
    #[error("associated token account is unusable: {0:?}")]
    AccountExistence(TokenAccountStatus),
    #[error("account required for the operation was not found")]
    AccountNotFound,
    #[error("stored account bytes do not match the expected layout")]
    InvalidAccountData,
    #[error("offer {id} is {status}, only REQUESTED offers can be acted on")]
    InvalidOfferStatus { id: String, status: OfferStatus },
    #[error("wallet declined to sign the transaction")]
    SignerRejected,
    #[error("transaction signing failed: {0}")]
    Signing(#[from] SignerError),
    #[error("transaction submission failed: {0}")]
    SubmissionFailed(String),
    #[error("transaction not confirmed within {0:?}")]
    NotConfirmedWithinTimeout(Duration),
    #[error("offer store error: {0}")]
    Store(String),
    #[error("RPC error: {0}")]
    Rpc(Box<solana_client::client_error::ClientError>),
    #[error("failed to parse pubkey: {0}")]
    ParsePubkey(#[from] ParsePubkeyError),
    #[error("program error: {0}")]
    Program(#[from] ProgramError),
    #[error("instruction serialization failed: {0}")]
    Serialize(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
}

impl From<solana_client::client_error::ClientError> for Error {
    fn from(value: solana_client::client_error::ClientError) -> Self {
        Self::Rpc(Box::new(value))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
