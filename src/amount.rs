//! Fixed-point offer amounts.
//!
//! Offers are quoted in SOL with at most one fractional digit. Amounts are
//! stored as an integer count of tenths of a SOL and only converted to
//! lamports at the instruction-building boundary, so fee math is plain
//! integer arithmetic and identical on every call.

use solana_sdk::native_token::LAMPORTS_PER_SOL;

use crate::error::{Error, Result};

/// Tenths of a SOL per SOL: the fixed-point scale of an offer amount.
pub const AMOUNT_SCALE: u64 = 10;

const LAMPORTS_PER_TENTH: u64 = LAMPORTS_PER_SOL / AMOUNT_SCALE;

/// A validated, positive offer amount with one-decimal precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfferAmount {
    tenths: u64,
}

impl OfferAmount {
    /// Validates and converts a SOL amount. Rejects non-finite, zero and
    /// negative values, and anything finer than one fractional digit.
    pub fn from_sol(value: f64) -> Result<Self> {
        if !value.is_finite() || value <= 0.0 {
            return Err(Error::Validation(
                "offer amount must be a positive number".into(),
            ));
        }
        let scaled = value * AMOUNT_SCALE as f64;
        if (scaled - scaled.round()).abs() > 1e-9 {
            return Err(Error::Validation(
                "offer amount accepts at most one decimal".into(),
            ));
        }
        Ok(Self {
            tenths: scaled.round() as u64,
        })
    }

    pub fn as_sol(&self) -> f64 {
        self.tenths as f64 / AMOUNT_SCALE as f64
    }

    pub fn lamports(&self) -> u64 {
        self.tenths * LAMPORTS_PER_TENTH
    }

    /// Fee share for a whole-number percentage of this amount.
    pub fn fee_lamports(&self, fee_percent: u64) -> u64 {
        self.lamports() * fee_percent / 100
    }

    /// Amount plus fee: what the escrow carries and the taker ultimately pays.
    pub fn total_lamports(&self, fee_percent: u64) -> u64 {
        self.lamports() + self.fee_lamports(fee_percent)
    }
}

/// Whether a raw user input is an actionable offer amount.
pub fn is_valid_amount(value: f64) -> bool {
    OfferAmount::from_sol(value).is_ok()
}
