use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{program_error::ProgramError, pubkey::Pubkey};

use crate::{constants::LOCK_RECORD_SEED, error::HubError};

/// Global lock entry for one collateral item.
///
/// The account address is derived from the item identity, so at most
/// one live lock can ever exist for a given item across all borrowers.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct LockRecord {
    /// Account discriminator
    pub discriminator: [u8; 8],

    /// Is initialized flag
    pub is_initialized: bool,

    /// Collection the item belongs to
    pub collection: Pubkey,

    /// Item identifier within the collection
    pub item_id: u64,

    /// Borrower currently holding the lock
    pub borrower: Pubkey,

    /// When the current lock was taken
    pub locked_at: i64,

    /// Whether the item is locked right now
    pub is_locked: bool,

    /// PDA bump
    pub bump: u8,
}

impl LockRecord {
    pub const DISCRIMINATOR: [u8; 8] = [76, 79, 67, 75, 82, 69, 67, 95]; // "LOCKREC_"

    pub const LEN: usize = 8 + // discriminator
        1 + // is_initialized
        32 + // collection
        8 + // item_id
        32 + // borrower
        8 + // locked_at
        1 + // is_locked
        1 + // bump
        32; // padding for growth

    pub fn new(collection: Pubkey, item_id: u64, bump: u8) -> Self {
        Self {
            discriminator: Self::DISCRIMINATOR,
            is_initialized: true,
            collection,
            item_id,
            borrower: Pubkey::default(),
            locked_at: 0,
            is_locked: false,
            bump,
        }
    }

    /// Validate lock record
    pub fn validate(&self) -> Result<(), ProgramError> {
        if self.discriminator != Self::DISCRIMINATOR {
            return Err(HubError::InvalidAccountData.into());
        }

        if !self.is_initialized {
            return Err(HubError::NotInitialized.into());
        }

        Ok(())
    }

    /// Take the lock for `borrower`
    pub fn acquire(&mut self, borrower: Pubkey, now: i64) -> Result<(), ProgramError> {
        if self.is_locked {
            return Err(HubError::ItemAlreadyLocked.into());
        }

        self.borrower = borrower;
        self.locked_at = now;
        self.is_locked = true;
        Ok(())
    }

    /// Release the lock held by `borrower`
    pub fn release(&mut self, borrower: &Pubkey) -> Result<(), ProgramError> {
        if !self.is_locked || self.borrower != *borrower {
            return Err(HubError::ItemNotLockedByCaller.into());
        }

        self.borrower = Pubkey::default();
        self.is_locked = false;
        Ok(())
    }
}

/// Derive the lock record PDA for one item
pub fn find_lock_record_address(
    program_id: &Pubkey,
    collection: &Pubkey,
    item_id: u64,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            LOCK_RECORD_SEED,
            collection.as_ref(),
            &item_id.to_le_bytes(),
        ],
        program_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_then_release_round_trip() {
        let borrower = Pubkey::new_unique();
        let mut lock = LockRecord::new(Pubkey::new_unique(), 42, 255);

        lock.acquire(borrower, 1_000).unwrap();
        assert!(lock.is_locked);
        assert_eq!(lock.borrower, borrower);
        assert_eq!(lock.locked_at, 1_000);

        lock.release(&borrower).unwrap();
        assert!(!lock.is_locked);

        // The record can be reused by another borrower afterwards
        let other = Pubkey::new_unique();
        lock.acquire(other, 2_000).unwrap();
        assert_eq!(lock.borrower, other);
    }

    #[test]
    fn test_double_acquire_rejected() {
        let mut lock = LockRecord::new(Pubkey::new_unique(), 42, 255);
        lock.acquire(Pubkey::new_unique(), 1_000).unwrap();

        let err = lock.acquire(Pubkey::new_unique(), 2_000).unwrap_err();
        assert_eq!(err, HubError::ItemAlreadyLocked.into());
    }

    #[test]
    fn test_release_by_stranger_rejected() {
        let mut lock = LockRecord::new(Pubkey::new_unique(), 42, 255);
        lock.acquire(Pubkey::new_unique(), 1_000).unwrap();

        let err = lock.release(&Pubkey::new_unique()).unwrap_err();
        assert_eq!(err, HubError::ItemNotLockedByCaller.into());
    }

    #[test]
    fn test_release_unlocked_record_rejected() {
        let owner = Pubkey::new_unique();
        let mut lock = LockRecord::new(Pubkey::new_unique(), 42, 255);
        assert!(lock.release(&owner).is_err());
    }
}
