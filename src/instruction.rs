//! Instruction builders for the escrow trade flows.
//!
//! Builders are pure data transforms: fully-resolved public keys and amounts
//! in, one instruction out. Business validation happens in the orchestration
//! entrypoints before any builder runs. The payload layout and the account
//! order must match the escrow program exactly; a drift is only detected as
//! an on-chain rejection.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_instruction, system_program,
    sysvar::rent,
};

use crate::error::Result;

/// Wire payload of the escrow program: a one-byte discriminant followed by
/// little-endian fields.
#[derive(BorshSerialize, BorshDeserialize, Debug, PartialEq)]
pub enum EscrowInstruction {
    /// Starts the trade. `amount` is the full lamport total the taker will
    /// pay (offer plus fee); `fee` is the fee share of that total.
    InitializeEscrow { amount: u64, fee: u64 },
    /// Settles the trade: deposited token to the taker, lamports to the
    /// initializer.
    Exchange,
    /// Returns custody of the deposited token to the initializer.
    CancelEscrow,
}

impl EscrowInstruction {
    /// Decodes a payload; the inverse of the builders' serialization.
    pub fn unpack(input: &[u8]) -> Result<Self> {
        Ok(Self::try_from_slice(input)?)
    }
}

/// Allocates space and rent-exempt lamports for a new account owned by the
/// given program. The new account must co-sign the transaction.
pub fn create_account(
    payer: &Pubkey,
    new_account: &Pubkey,
    lamports: u64,
    space: u64,
    owner: &Pubkey,
) -> Instruction {
    system_instruction::create_account(payer, new_account, lamports, space, owner)
}

/// Initializes a freshly created token account for `mint`, owned by `owner`.
/// Used only on the wrapped-native preparation path.
pub fn initialize_token_account(
    account: &Pubkey,
    mint: &Pubkey,
    owner: &Pubkey,
) -> Result<Instruction> {
    Ok(spl_token::instruction::initialize_account(
        &spl_token::id(),
        account,
        mint,
        owner,
    )?)
}

/// Moves tokens into a temporary account prior to deposit. Used only on the
/// wrapped-native preparation path.
pub fn transfer_tokens(
    source: &Pubkey,
    mint: &Pubkey,
    destination: &Pubkey,
    authority: &Pubkey,
    amount: u64,
    decimals: u8,
) -> Result<Instruction> {
    Ok(spl_token::instruction::transfer_checked(
        &spl_token::id(),
        source,
        mint,
        destination,
        authority,
        &[],
        amount,
        decimals,
    )?)
}

/// Creates the canonical associated token account for `(owner, mint)`,
/// funded by `payer`.
pub fn create_associated_token_account(
    payer: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
) -> Instruction {
    spl_associated_token_account::instruction::create_associated_token_account(
        payer,
        owner,
        mint,
        &spl_token::id(),
    )
}

/// Builds `InitializeEscrow`.
///
/// Accounts expected by the program:
/// 0. `[signer]` initializer
/// 1. `[writable]` initializer's deposit token account (the traded token)
/// 2. `[]` initializer's receive wallet account
/// 3. `[writable]` escrow account, created earlier in the same transaction
/// 4. `[]` rent sysvar
/// 5. `[]` token program
pub fn initialize_escrow(
    program_id: &Pubkey,
    initializer: &Pubkey,
    deposit_token_account: &Pubkey,
    receive_wallet_account: &Pubkey,
    escrow_account: &Pubkey,
    amount: u64,
    fee: u64,
) -> Result<Instruction> {
    let data = borsh::to_vec(&EscrowInstruction::InitializeEscrow { amount, fee })?;
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*initializer, true),
            AccountMeta::new(*deposit_token_account, false),
            AccountMeta::new_readonly(*receive_wallet_account, false),
            AccountMeta::new(*escrow_account, false),
            AccountMeta::new_readonly(rent::id(), false),
            AccountMeta::new_readonly(spl_token::id(), false),
        ],
        data,
    })
}

/// Builds `Exchange`.
///
/// Accounts expected by the program:
/// 0. `[signer, writable]` taker
/// 1. `[writable]` taker's receiving token account
/// 2. `[writable]` PDA-held deposit token account
/// 3. `[writable]` initializer's receive wallet account
/// 4. `[writable]` initializer's main account
/// 5. `[writable]` escrow account, closed by the program on success
/// 6. `[]` escrow authority PDA
/// 7. `[]` token program
/// 8. `[]` system program
#[allow(clippy::too_many_arguments)]
pub fn exchange(
    program_id: &Pubkey,
    taker: &Pubkey,
    taker_receive_account: &Pubkey,
    pda_deposit_account: &Pubkey,
    initializer_receive_account: &Pubkey,
    initializer_main_account: &Pubkey,
    escrow_account: &Pubkey,
    pda: &Pubkey,
) -> Result<Instruction> {
    let data = borsh::to_vec(&EscrowInstruction::Exchange)?;
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*taker, true),
            AccountMeta::new(*taker_receive_account, false),
            AccountMeta::new(*pda_deposit_account, false),
            AccountMeta::new(*initializer_receive_account, false),
            AccountMeta::new(*initializer_main_account, false),
            AccountMeta::new(*escrow_account, false),
            AccountMeta::new_readonly(*pda, false),
            AccountMeta::new_readonly(spl_token::id(), false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data,
    })
}

/// Builds `CancelEscrow`.
///
/// Accounts expected by the program:
/// 0. `[signer, writable]` initializer
/// 1. `[writable]` PDA-held deposit token account
/// 2. `[]` escrow authority PDA
/// 3. `[writable]` escrow account, closed by the program on success
/// 4. `[]` token program
pub fn cancel_escrow(
    program_id: &Pubkey,
    initializer: &Pubkey,
    pda_deposit_account: &Pubkey,
    pda: &Pubkey,
    escrow_account: &Pubkey,
) -> Result<Instruction> {
    let data = borsh::to_vec(&EscrowInstruction::CancelEscrow)?;
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*initializer, true),
            AccountMeta::new(*pda_deposit_account, false),
            AccountMeta::new_readonly(*pda, false),
            AccountMeta::new(*escrow_account, false),
            AccountMeta::new_readonly(spl_token::id(), false),
        ],
        data,
    })
}

/// Reclaims rent from a temporary wrapped-native account back to its owner.
pub fn close_account(
    account_to_close: &Pubkey,
    destination: &Pubkey,
    owner: &Pubkey,
) -> Result<Instruction> {
    Ok(spl_token::instruction::close_account(
        &spl_token::id(),
        account_to_close,
        destination,
        owner,
        &[],
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_escrow_payload_is_tag_then_amount_then_fee() {
        let data =
            borsh::to_vec(&EscrowInstruction::InitializeEscrow { amount: 10_400_000_000, fee: 400_000_000 })
                .unwrap();
        assert_eq!(data.len(), 17);
        assert_eq!(data[0], 0);
        assert_eq!(&data[1..9], &10_400_000_000u64.to_le_bytes());
        assert_eq!(&data[9..17], &400_000_000u64.to_le_bytes());
        assert_eq!(
            EscrowInstruction::unpack(&data).unwrap(),
            EscrowInstruction::InitializeEscrow { amount: 10_400_000_000, fee: 400_000_000 }
        );
    }

    #[test]
    fn exchange_and_cancel_are_tag_only() {
        assert_eq!(borsh::to_vec(&EscrowInstruction::Exchange).unwrap(), vec![1]);
        assert_eq!(borsh::to_vec(&EscrowInstruction::CancelEscrow).unwrap(), vec![2]);
    }

    #[test]
    fn initialize_escrow_account_order_and_flags() {
        let program_id = Pubkey::new_unique();
        let initializer = Pubkey::new_unique();
        let deposit = Pubkey::new_unique();
        let receive = Pubkey::new_unique();
        let escrow = Pubkey::new_unique();
        let ix = initialize_escrow(
            &program_id,
            &initializer,
            &deposit,
            &receive,
            &escrow,
            10_400_000_000,
            400_000_000,
        )
        .unwrap();

        assert_eq!(ix.program_id, program_id);
        let keys: Vec<Pubkey> = ix.accounts.iter().map(|m| m.pubkey).collect();
        assert_eq!(
            keys,
            vec![initializer, deposit, receive, escrow, rent::id(), spl_token::id()]
        );
        assert!(ix.accounts[0].is_signer);
        assert!(!ix.accounts[0].is_writable);
        assert!(ix.accounts[1].is_writable);
        assert!(ix.accounts[3].is_writable);
        assert!(!ix.accounts[4].is_writable);
    }

    #[test]
    fn exchange_references_escrow_and_pda() {
        let program_id = Pubkey::new_unique();
        let taker = Pubkey::new_unique();
        let escrow = Pubkey::new_unique();
        let pda = Pubkey::new_unique();
        let ix = exchange(
            &program_id,
            &taker,
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &escrow,
            &pda,
        )
        .unwrap();

        assert_eq!(ix.accounts.len(), 9);
        assert!(ix.accounts[0].is_signer);
        assert_eq!(ix.accounts[5].pubkey, escrow);
        assert_eq!(ix.accounts[6].pubkey, pda);
        assert_eq!(ix.accounts[7].pubkey, spl_token::id());
        assert_eq!(ix.accounts[8].pubkey, system_program::id());
        assert_eq!(ix.data, vec![1]);
    }

    #[test]
    fn cancel_escrow_targets_the_deposit_account() {
        let program_id = Pubkey::new_unique();
        let initializer = Pubkey::new_unique();
        let deposit = Pubkey::new_unique();
        let pda = Pubkey::new_unique();
        let escrow = Pubkey::new_unique();
        let ix = cancel_escrow(&program_id, &initializer, &deposit, &pda, &escrow).unwrap();

        assert_eq!(ix.accounts.len(), 5);
        assert!(ix.accounts[0].is_signer);
        assert_eq!(ix.accounts[1].pubkey, deposit);
        assert!(ix.accounts[1].is_writable);
        assert_eq!(ix.accounts[3].pubkey, escrow);
        assert_eq!(ix.data, vec![2]);
    }

    #[test]
    fn wrapped_native_helpers_target_the_token_program() {
        let account = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let init = initialize_token_account(&account, &spl_token::native_mint::id(), &owner).unwrap();
        assert_eq!(init.program_id, spl_token::id());

        let transfer = transfer_tokens(
            &Pubkey::new_unique(),
            &spl_token::native_mint::id(),
            &account,
            &owner,
            1_000_000_000,
            spl_token::native_mint::DECIMALS,
        )
        .unwrap();
        assert_eq!(transfer.program_id, spl_token::id());

        let close = close_account(&account, &owner, &owner).unwrap();
        assert_eq!(close.program_id, spl_token::id());
    }
}
