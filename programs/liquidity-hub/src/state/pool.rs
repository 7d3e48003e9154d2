use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{program_error::ProgramError, pubkey::Pubkey};

use crate::{constants::HUB_POOL_SEED, error::HubError};

/// Global pool accounting shared by every position
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct HubPool {
    /// Account discriminator
    pub discriminator: [u8; 8],

    /// Is initialized flag
    pub is_initialized: bool,

    /// Sum of all lender principals
    pub total_deposited: u64,

    /// Sum of all borrower principals, capitalized interest included
    pub total_borrowed: u64,

    /// Cumulative interest paid out to lenders
    pub total_interest_paid: u64,

    /// Number of positions resolved through default
    pub total_defaults: u64,

    /// Last update timestamp
    pub last_update: i64,

    /// PDA bump
    pub bump: u8,
}

impl HubPool {
    pub const DISCRIMINATOR: [u8; 8] = [72, 85, 66, 80, 79, 79, 76, 95]; // "HUBPOOL_"

    pub const LEN: usize = 8 + // discriminator
        1 + // is_initialized
        8 + // total_deposited
        8 + // total_borrowed
        8 + // total_interest_paid
        8 + // total_defaults
        8 + // last_update
        1 + // bump
        64; // padding for growth

    pub fn new(bump: u8) -> Self {
        Self {
            discriminator: Self::DISCRIMINATOR,
            is_initialized: true,
            total_deposited: 0,
            total_borrowed: 0,
            total_interest_paid: 0,
            total_defaults: 0,
            last_update: 0,
            bump,
        }
    }

    /// Validate pool state
    pub fn validate(&self) -> Result<(), ProgramError> {
        if self.discriminator != Self::DISCRIMINATOR {
            return Err(HubError::InvalidAccountData.into());
        }

        if !self.is_initialized {
            return Err(HubError::NotInitialized.into());
        }

        Ok(())
    }

    /// Liquidity not currently lent out
    pub fn available_liquidity(&self) -> u64 {
        self.total_deposited.saturating_sub(self.total_borrowed)
    }

    pub fn add_deposited(&mut self, amount: u64) -> Result<(), ProgramError> {
        self.total_deposited = self
            .total_deposited
            .checked_add(amount)
            .ok_or(HubError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn remove_deposited(&mut self, amount: u64) -> Result<(), ProgramError> {
        self.total_deposited = self
            .total_deposited
            .checked_sub(amount)
            .ok_or(HubError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn add_borrowed(&mut self, amount: u64) -> Result<(), ProgramError> {
        self.total_borrowed = self
            .total_borrowed
            .checked_add(amount)
            .ok_or(HubError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn remove_borrowed(&mut self, amount: u64) -> Result<(), ProgramError> {
        self.total_borrowed = self
            .total_borrowed
            .checked_sub(amount)
            .ok_or(HubError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn record_interest_paid(&mut self, amount: u64) -> Result<(), ProgramError> {
        self.total_interest_paid = self
            .total_interest_paid
            .checked_add(amount)
            .ok_or(HubError::ArithmeticOverflow)?;
        Ok(())
    }
}

/// Derive the hub pool PDA
pub fn find_hub_pool_address(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[HUB_POOL_SEED], program_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_liquidity_tracks_borrows() {
        let mut pool = HubPool::new(255);
        pool.add_deposited(1_000).unwrap();
        assert_eq!(pool.available_liquidity(), 1_000);

        pool.add_borrowed(400).unwrap();
        assert_eq!(pool.available_liquidity(), 600);

        pool.remove_borrowed(400).unwrap();
        pool.remove_deposited(1_000).unwrap();
        assert_eq!(pool.available_liquidity(), 0);
    }

    #[test]
    fn test_underflow_is_rejected() {
        let mut pool = HubPool::new(255);
        assert!(pool.remove_deposited(1).is_err());
        assert!(pool.remove_borrowed(1).is_err());
    }
}
