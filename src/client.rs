//! Orchestration entrypoints for the three trade actions.
//!
//! Each entrypoint runs as one suspendable unit of work per user action:
//! validate, resolve accounts, build the ordered instruction list, package
//! it as a single transaction, sign/submit/confirm, and only then move the
//! offer record. Callers must not start a second action for the same offer
//! while one is in flight (a busy flag on the triggering action is the
//! caller's contract); actions on different offers are independent.

use std::time::Duration;

use solana_sdk::{
    pubkey::Pubkey,
    signature::Keypair,
    signer::Signer,
};
use tracing::{debug, info};

use crate::{
    account::{self, TokenAccountStatus},
    address,
    amount::OfferAmount,
    error::{Error, Result},
    instruction,
    rpc::ChainClient,
    settings::Settings,
    state::{self, EscrowAccount},
    store::{NewOffer, Offer, OfferStatus, OfferStore},
    transaction::{self, WalletSigner},
};

/// Client for one wallet's trade actions against the escrow program.
///
/// The chain, wallet and store collaborators are injected; the client holds
/// no other state and no locks.
pub struct EscrowClient<C, W, S> {
    chain: C,
    wallet: W,
    store: S,
    program_id: Pubkey,
    fee_percent: u64,
    confirmation_timeout: Duration,
}

impl<C, W, S> EscrowClient<C, W, S>
where
    C: ChainClient,
    W: WalletSigner,
    S: OfferStore,
{
    pub fn new(chain: C, wallet: W, store: S, settings: &Settings) -> Result<Self> {
        let program_id = settings.program_id.parse()?;
        Ok(Self::with_parts(
            chain,
            wallet,
            store,
            program_id,
            settings.fee_percent,
            settings.confirmation_timeout(),
        ))
    }

    pub fn with_parts(
        chain: C,
        wallet: W,
        store: S,
        program_id: Pubkey,
        fee_percent: u64,
        confirmation_timeout: Duration,
    ) -> Self {
        Self {
            chain,
            wallet,
            store,
            program_id,
            fee_percent,
            confirmation_timeout,
        }
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    /// Proposes a trade: the connected wallet (the seller) escrows its NFT
    /// against a SOL amount the buyer will pay.
    ///
    /// One transaction carries, in order: the seller's wrapped-SOL
    /// associated account creation when it does not exist yet, the escrow
    /// account allocation, and `InitializeEscrow` with the fee-inclusive
    /// total. The offer record is created only after the transaction
    /// confirmed.
    pub async fn request_offer(
        &self,
        buyer_address: &str,
        nft_address: &str,
        amount_sol: f64,
    ) -> Result<Offer> {
        let amount = OfferAmount::from_sol(amount_sol)?;
        let buyer = parse_required(buyer_address, "buyer address")?;
        let nft_mint = parse_required(nft_address, "NFT mint address")?;
        let seller = self.wallet.pubkey();

        let mut instructions = Vec::new();

        // The seller receives the payment in SOL; the wrapped-SOL associated
        // account backs the fee share routing.
        let native_mint = spl_token::native_mint::id();
        let seller_receive = address::associated_token_address(&seller, &native_mint);
        if self
            .ensure_associated_account(&seller_receive, &native_mint)
            .await?
        {
            instructions.push(instruction::create_associated_token_account(
                &seller,
                &seller,
                &native_mint,
            ));
        }

        let deposit_token_account = address::associated_token_address(&seller, &nft_mint);
        debug!(deposit = %deposit_token_account, receive = %seller_receive, "resolved seller accounts");

        // Fresh keypair backs the escrow account; it must co-sign since the
        // transaction allocates it.
        let escrow_keypair = Keypair::new();
        let escrow_address = Signer::pubkey(&escrow_keypair);
        let rent = self
            .chain
            .minimum_balance_for_rent_exemption(EscrowAccount::LEN)
            .await?;
        instructions.push(instruction::create_account(
            &seller,
            &escrow_address,
            rent,
            EscrowAccount::LEN as u64,
            &self.program_id,
        ));
        instructions.push(instruction::initialize_escrow(
            &self.program_id,
            &seller,
            &deposit_token_account,
            &seller,
            &escrow_address,
            amount.total_lamports(self.fee_percent),
            amount.fee_lamports(self.fee_percent),
        )?);

        let tx = transaction::assemble(&instructions, &seller);
        let signature = transaction::submit(
            &self.chain,
            &self.wallet,
            tx,
            &[&escrow_keypair],
            self.confirmation_timeout,
        )
        .await?;
        info!(%signature, escrow = %escrow_address, "escrow initialized");

        self.store
            .insert(NewOffer {
                buyer_address: buyer.to_string(),
                seller_address: seller.to_string(),
                escrow_address: escrow_address.to_string(),
                nft_address: nft_mint.to_string(),
                offered_amount: amount.as_sol(),
            })
            .await
    }

    /// Settles a requested offer: the connected wallet (the buyer) pays the
    /// escrowed total and receives the NFT.
    pub async fn accept_offer(&self, offer: &Offer) -> Result<Offer> {
        self.ensure_actionable(offer)?;
        let escrow_address: Pubkey = offer.escrow_address.parse()?;
        let nft_mint: Pubkey = offer.nft_address.parse()?;
        let taker = self.wallet.pubkey();

        let escrow_state = state::fetch_escrow_account(&self.chain, &escrow_address).await?;

        let mut instructions = Vec::new();
        let taker_receive = address::associated_token_address(&taker, &nft_mint);
        if self
            .ensure_associated_account(&taker_receive, &nft_mint)
            .await?
        {
            instructions.push(instruction::create_associated_token_account(
                &taker, &taker, &nft_mint,
            ));
        }

        let (pda, _bump) = address::escrow_authority(&self.program_id)?;
        instructions.push(instruction::exchange(
            &self.program_id,
            &taker,
            &taker_receive,
            &escrow_state.initializer_deposit_token_account,
            &escrow_state.initializer_receive_wallet_account,
            &escrow_state.initializer_key,
            &escrow_address,
            &pda,
        )?);

        let tx = transaction::assemble(&instructions, &taker);
        let signature =
            transaction::submit(&self.chain, &self.wallet, tx, &[], self.confirmation_timeout)
                .await?;
        info!(%signature, offer = %offer.id, "offer accepted on chain");

        self.store
            .update_status(&offer.id, OfferStatus::Accepted)
            .await
    }

    /// Withdraws a requested offer: the connected wallet (the initializer)
    /// takes back custody of the deposited NFT.
    pub async fn cancel_offer(&self, offer: &Offer) -> Result<Offer> {
        self.ensure_actionable(offer)?;
        let escrow_address: Pubkey = offer.escrow_address.parse()?;
        let nft_mint: Pubkey = offer.nft_address.parse()?;
        let initializer = self.wallet.pubkey();

        let (pda, _bump) = address::escrow_authority(&self.program_id)?;
        let deposit_token_account = address::associated_token_address(&initializer, &nft_mint);
        let ix = instruction::cancel_escrow(
            &self.program_id,
            &initializer,
            &deposit_token_account,
            &pda,
            &escrow_address,
        )?;

        let tx = transaction::assemble(&[ix], &initializer);
        let signature =
            transaction::submit(&self.chain, &self.wallet, tx, &[], self.confirmation_timeout)
                .await?;
        info!(%signature, offer = %offer.id, "offer canceled on chain");

        self.store
            .update_status(&offer.id, OfferStatus::Canceled)
            .await
    }

    /// Rejects terminal offers before any on-chain work is attempted.
    fn ensure_actionable(&self, offer: &Offer) -> Result<()> {
        if offer.status != OfferStatus::Requested {
            return Err(Error::InvalidOfferStatus {
                id: offer.id.clone(),
                status: offer.status,
            });
        }
        Ok(())
    }

    /// Returns whether the associated account still has to be created.
    /// Anything stored at the address that is not a usable token account
    /// for the mint is an error.
    async fn ensure_associated_account(
        &self,
        address: &Pubkey,
        expected_mint: &Pubkey,
    ) -> Result<bool> {
        match account::token_account_status(&self.chain, address, expected_mint).await? {
            TokenAccountStatus::NotFound => {
                debug!(%address, "associated account missing, will create");
                Ok(true)
            }
            TokenAccountStatus::Exists => Ok(false),
            status => Err(Error::AccountExistence(status)),
        }
    }
}

fn parse_required(value: &str, what: &str) -> Result<Pubkey> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(format!("{what} is required")));
    }
    Ok(trimmed.parse()?)
}
