//! Client-side orchestration for an NFT-for-SOL escrow trade.
//!
//! A seller escrows an NFT against a SOL amount:
//! - `request_offer` creates the on-chain escrow account and records the
//!   offer as `REQUESTED`
//! - the buyer can `accept_offer` to pay the fee-inclusive total and take
//!   the NFT (`ACCEPTED`), or
//! - the seller can `cancel_offer` to take back custody (`CANCELED`)
//!
//! The crate derives every program-owned and associated account, builds the
//! ordered instruction list per action, runs the sign/submit/confirm
//! protocol and keeps the off-chain offer record consistent with the
//! irreversible on-chain outcome: the record only ever advances after a
//! confirmed transaction. The wallet, the RPC endpoint and the offer store
//! are injected capability traits, never ambient globals.

pub mod account;
pub mod address;
pub mod amount;
pub mod client;
pub mod error;
pub mod instruction;
pub mod rpc;
pub mod settings;
pub mod state;
pub mod store;
pub mod transaction;

pub use account::{classify_token_account, token_account_status, TokenAccountStatus};
pub use address::{associated_token_address, escrow_authority, ESCROW_AUTHORITY_SEED};
pub use amount::{is_valid_amount, OfferAmount};
pub use client::EscrowClient;
pub use error::{Error, Result};
pub use instruction::EscrowInstruction;
pub use rpc::ChainClient;
pub use settings::Settings;
pub use state::EscrowAccount;
pub use store::{MemoryOfferStore, NewOffer, Offer, OfferStatus, OfferStore};
pub use transaction::{assemble, submit, WalletSigner};
