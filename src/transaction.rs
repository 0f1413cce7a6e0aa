//! Transaction assembly and the signing/submission/confirmation protocol.
//!
//! Instruction order is preserved by [`assemble`]: later instructions may
//! depend on accounts created by earlier ones in the same transaction.
//! Ephemeral keypairs backing to-be-created accounts co-sign before the
//! wallet countersigns, and nothing is ever sent unless the wallet signed.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::Transaction,
};
use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    rpc::ChainClient,
};

const CONFIRMATION_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// A wallet that can countersign a transaction. Signing may suspend
/// indefinitely while a human decides; a decline resolves to
/// [`Error::SignerRejected`].
#[async_trait]
pub trait WalletSigner: Send + Sync {
    fn pubkey(&self) -> Pubkey;
    async fn sign_transaction(&self, transaction: Transaction) -> Result<Transaction>;
}

/// Local keypair wallet; signs immediately, never declines.
#[async_trait]
impl WalletSigner for Keypair {
    fn pubkey(&self) -> Pubkey {
        Signer::pubkey(self)
    }

    async fn sign_transaction(&self, mut transaction: Transaction) -> Result<Transaction> {
        let blockhash = transaction.message.recent_blockhash;
        transaction.try_partial_sign(&[self], blockhash)?;
        Ok(transaction)
    }
}

#[async_trait]
impl<T: WalletSigner + ?Sized> WalletSigner for Arc<T> {
    fn pubkey(&self) -> Pubkey {
        (**self).pubkey()
    }

    async fn sign_transaction(&self, transaction: Transaction) -> Result<Transaction> {
        (**self).sign_transaction(transaction).await
    }
}

/// Packages instructions into one transaction, in the given order, paid for
/// by `fee_payer`.
pub fn assemble(instructions: &[Instruction], fee_payer: &Pubkey) -> Transaction {
    Transaction::new_with_payer(instructions, Some(fee_payer))
}

/// Signs, sends and confirms one transaction.
///
/// The offer record is only ever advanced after this returns `Ok`; every
/// failure leaves the off-chain state untouched. On
/// [`Error::NotConfirmedWithinTimeout`] the on-chain outcome is unknown and
/// the caller should reconcile by re-checking the escrow account.
pub async fn submit<C, W>(
    chain: &C,
    wallet: &W,
    mut transaction: Transaction,
    ephemeral_signers: &[&Keypair],
    confirmation_timeout: Duration,
) -> Result<Signature>
where
    C: ChainClient + ?Sized,
    W: WalletSigner + ?Sized,
{
    let blockhash = chain.latest_blockhash().await?;
    transaction.message.recent_blockhash = blockhash;
    if !ephemeral_signers.is_empty() {
        let signers: Vec<&Keypair> = ephemeral_signers.to_vec();
        transaction.try_partial_sign(&signers, blockhash)?;
    }

    let transaction = wallet.sign_transaction(transaction).await?;

    let signature = chain
        .send_transaction(&transaction)
        .await
        .map_err(|e| Error::SubmissionFailed(e.to_string()))?;
    debug!(%signature, "transaction sent, awaiting confirmation");

    wait_for_confirmation(chain, &signature, confirmation_timeout).await?;
    Ok(signature)
}

async fn wait_for_confirmation<C: ChainClient + ?Sized>(
    chain: &C,
    signature: &Signature,
    timeout: Duration,
) -> Result<()> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if chain.confirm_signature(signature).await? {
            return Ok(());
        }
        if tokio::time::Instant::now() >= deadline {
            warn!(%signature, ?timeout, "confirmation wait timed out, on-chain outcome unknown");
            return Err(Error::NotConfirmedWithinTimeout(timeout));
        }
        tokio::time::sleep(CONFIRMATION_POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use solana_sdk::system_instruction;

    use super::*;

    #[test]
    fn assemble_preserves_instruction_order_and_fee_payer() {
        let payer = Pubkey::new_unique();
        let first = system_instruction::transfer(&payer, &Pubkey::new_unique(), 1);
        let second = system_instruction::transfer(&payer, &Pubkey::new_unique(), 2);
        let transaction = assemble(&[first.clone(), second.clone()], &payer);

        assert_eq!(transaction.message.account_keys[0], payer);
        assert_eq!(transaction.message.instructions.len(), 2);
        assert_eq!(transaction.message.instructions[0].data, first.data);
        assert_eq!(transaction.message.instructions[1].data, second.data);
    }

    #[tokio::test]
    async fn keypair_wallet_signs_in_place() {
        let keypair = Keypair::new();
        let payer = WalletSigner::pubkey(&keypair);
        let transaction = assemble(
            &[system_instruction::transfer(&payer, &Pubkey::new_unique(), 1)],
            &payer,
        );
        let signed = keypair.sign_transaction(transaction).await.unwrap();
        assert!(signed.signatures[0] != Signature::default());
    }
}
