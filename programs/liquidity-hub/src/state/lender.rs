use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{program_error::ProgramError, pubkey::Pubkey};

use crate::{constants::LENDER_POSITION_SEED, error::HubError, interest::InterestModel};

/// A lender's share of the pool plus interest earned so far
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct LenderPosition {
    /// Account discriminator
    pub discriminator: [u8; 8],

    /// Is initialized flag
    pub is_initialized: bool,

    /// Position owner
    pub owner: Pubkey,

    /// Deposited principal
    pub amount: u64,

    /// Interest accrued up to `last_update_time`, not yet paid out
    pub accumulated_interest: u64,

    /// Timestamp of the last checkpoint, monotone non-decreasing
    pub last_update_time: i64,

    /// PDA bump
    pub bump: u8,
}

impl LenderPosition {
    pub const DISCRIMINATOR: [u8; 8] = [76, 69, 78, 68, 80, 79, 83, 95]; // "LENDPOS_"

    pub const LEN: usize = 8 + // discriminator
        1 + // is_initialized
        32 + // owner
        8 + // amount
        8 + // accumulated_interest
        8 + // last_update_time
        1 + // bump
        32; // padding for growth

    pub fn new(owner: Pubkey, now: i64, bump: u8) -> Self {
        Self {
            discriminator: Self::DISCRIMINATOR,
            is_initialized: true,
            owner,
            amount: 0,
            accumulated_interest: 0,
            last_update_time: now,
            bump,
        }
    }

    /// Validate position state
    pub fn validate(&self) -> Result<(), ProgramError> {
        if self.discriminator != Self::DISCRIMINATOR {
            return Err(HubError::InvalidAccountData.into());
        }

        if !self.is_initialized {
            return Err(HubError::NotInitialized.into());
        }

        Ok(())
    }

    /// Fold interest accrued since the last checkpoint into
    /// `accumulated_interest` and stamp the position.
    ///
    /// The timestamp never moves backwards; a stale clock accrues
    /// nothing and leaves the position untouched.
    pub fn checkpoint(&mut self, now: i64, lending_rate_bps: u16) -> Result<(), ProgramError> {
        let pending =
            InterestModel::accrue(self.amount, self.last_update_time, now, lending_rate_bps)?;

        self.accumulated_interest = self
            .accumulated_interest
            .checked_add(pending)
            .ok_or(HubError::ArithmeticOverflow)?;
        self.last_update_time = self.last_update_time.max(now);

        Ok(())
    }

    /// True when there is nothing left to track
    pub fn is_empty(&self) -> bool {
        self.amount == 0 && self.accumulated_interest == 0
    }
}

/// Derive a lender position PDA
pub fn find_lender_position_address(program_id: &Pubkey, owner: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[LENDER_POSITION_SEED, owner.as_ref()], program_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SECONDS_PER_YEAR;

    #[test]
    fn test_checkpoint_accumulates_and_stamps() {
        let mut position = LenderPosition::new(Pubkey::new_unique(), 0, 255);
        position.amount = 1_000_000;

        let year = SECONDS_PER_YEAR as i64;
        position.checkpoint(year, 300).unwrap();

        assert_eq!(position.accumulated_interest, 49_050);
        assert_eq!(position.last_update_time, year);

        // A second checkpoint at the same instant accrues nothing more
        position.checkpoint(year, 300).unwrap();
        assert_eq!(position.accumulated_interest, 49_050);
    }

    #[test]
    fn test_checkpoint_never_rewinds_the_clock() {
        let mut position = LenderPosition::new(Pubkey::new_unique(), 1_000, 255);
        position.amount = 500;

        position.checkpoint(100, 300).unwrap();
        assert_eq!(position.accumulated_interest, 0);
        assert_eq!(position.last_update_time, 1_000);
    }

    #[test]
    fn test_is_empty_requires_both_fields_drained() {
        let mut position = LenderPosition::new(Pubkey::new_unique(), 0, 255);
        assert!(position.is_empty());

        position.amount = 10;
        assert!(!position.is_empty());

        position.amount = 0;
        position.accumulated_interest = 3;
        assert!(!position.is_empty());
    }
}
