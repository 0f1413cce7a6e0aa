//! Deterministic address derivation.
//!
//! Both derivations are pure functions of their inputs and are recomputed on
//! every invocation; nothing here touches the network or caches across
//! sessions.

use solana_sdk::pubkey::Pubkey;

use crate::error::{Error, Result};

/// Seed of the PDA that holds signing authority over deposited tokens.
pub const ESCROW_AUTHORITY_SEED: &[u8] = b"escrow";

/// Derives the escrow authority PDA and its bump for the given program.
///
/// Exhausting the bump search range is effectively unreachable but maps to a
/// distinct error rather than a panic.
pub fn escrow_authority(program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    Pubkey::try_find_program_address(&[ESCROW_AUTHORITY_SEED], program_id)
        .ok_or(Error::AddressDerivation)
}

/// Canonical associated token address for `(owner, mint)`.
pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    spl_associated_token_account::get_associated_token_address(owner, mint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escrow_authority_is_deterministic() {
        let program_id = Pubkey::new_unique();
        let (first, first_bump) = escrow_authority(&program_id).unwrap();
        let (second, second_bump) = escrow_authority(&program_id).unwrap();
        assert_eq!(first, second);
        assert_eq!(first_bump, second_bump);
        assert!(!first.is_on_curve());
    }

    #[test]
    fn different_programs_yield_different_authorities() {
        let (a, _) = escrow_authority(&Pubkey::new_unique()).unwrap();
        let (b, _) = escrow_authority(&Pubkey::new_unique()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn associated_token_address_round_trips() {
        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        assert_eq!(
            associated_token_address(&owner, &mint),
            associated_token_address(&owner, &mint)
        );
        assert_ne!(
            associated_token_address(&owner, &mint),
            associated_token_address(&owner, &Pubkey::new_unique())
        );
    }
}
