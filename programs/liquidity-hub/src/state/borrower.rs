use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{program_error::ProgramError, pubkey::Pubkey};

use crate::{
    constants::{BORROWER_POSITION_SEED, MAX_COLLATERAL_ITEMS},
    error::HubError,
};

/// One locked collateral item, identified by collection and item id
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollateralItemRef {
    pub collection: Pubkey,
    pub item_id: u64,
}

/// A borrower's collateral set and outstanding debt
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct BorrowerPosition {
    /// Account discriminator
    pub discriminator: [u8; 8],

    /// Is initialized flag
    pub is_initialized: bool,

    /// Position owner
    pub owner: Pubkey,

    /// Locked items in lock order
    pub collateral_items: Vec<CollateralItemRef>,

    /// Cached sum of item valuations as of the last recomputation
    pub total_collateral_value: u64,

    /// Outstanding principal, capitalized interest included
    pub borrowed_amount: u64,

    /// Timestamp of the last checkpoint, monotone non-decreasing
    pub last_update_time: i64,

    /// PDA bump
    pub bump: u8,
}

impl BorrowerPosition {
    pub const DISCRIMINATOR: [u8; 8] = [66, 79, 82, 82, 80, 79, 83, 95]; // "BORRPOS_"

    pub const LEN: usize = 8 + // discriminator
        1 + // is_initialized
        32 + // owner
        4 + MAX_COLLATERAL_ITEMS * 40 + // collateral_items vec (32 + 8 per item)
        8 + // total_collateral_value
        8 + // borrowed_amount
        8 + // last_update_time
        1 + // bump
        32; // padding for growth

    pub fn new(owner: Pubkey, now: i64, bump: u8) -> Self {
        Self {
            discriminator: Self::DISCRIMINATOR,
            is_initialized: true,
            owner,
            collateral_items: Vec::new(),
            total_collateral_value: 0,
            borrowed_amount: 0,
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

        if self.borrowed_amount > 0 && self.collateral_items.is_empty() {
            return Err(HubError::InvalidAccountData.into());
        }

        Ok(())
    }

    pub fn has_item(&self, collection: &Pubkey, item_id: u64) -> bool {
        self.collateral_items
            .iter()
            .any(|item| item.collection == *collection && item.item_id == item_id)
    }

    /// Append an item and grow the value cache by its valuation
    pub fn add_item(&mut self, item: CollateralItemRef, unit_price: u64) -> Result<(), ProgramError> {
        if self.collateral_items.len() >= MAX_COLLATERAL_ITEMS {
            return Err(HubError::CollateralLimitReached.into());
        }

        if self.has_item(&item.collection, item.item_id) {
            return Err(HubError::ItemAlreadyLocked.into());
        }

        self.collateral_items.push(item);
        self.total_collateral_value = self
            .total_collateral_value
            .checked_add(unit_price)
            .ok_or(HubError::ArithmeticOverflow)?;

        Ok(())
    }

    /// Remove an item, preserving the lock order of the rest. The value
    /// cache is left to the caller, which prices the whole removal batch.
    pub fn remove_item(&mut self, collection: &Pubkey, item_id: u64) -> Result<(), ProgramError> {
        let index = self
            .collateral_items
            .iter()
            .position(|item| item.collection == *collection && item.item_id == item_id)
            .ok_or(HubError::ItemNotLockedByCaller)?;

        self.collateral_items.remove(index);
        Ok(())
    }

    /// True when there is neither debt nor collateral left
    pub fn is_empty(&self) -> bool {
        self.borrowed_amount == 0 && self.collateral_items.is_empty()
    }

    /// Zero out the position completely
    pub fn clear(&mut self) {
        self.collateral_items.clear();
        self.total_collateral_value = 0;
        self.borrowed_amount = 0;
    }
}

/// Derive a borrower position PDA
pub fn find_borrower_position_address(program_id: &Pubkey, owner: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[BORROWER_POSITION_SEED, owner.as_ref()], program_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(collection: Pubkey, item_id: u64) -> CollateralItemRef {
        CollateralItemRef {
            collection,
            item_id,
        }
    }

    #[test]
    fn test_add_and_remove_preserve_lock_order() {
        let collection = Pubkey::new_unique();
        let mut position = BorrowerPosition::new(Pubkey::new_unique(), 0, 255);

        position.add_item(item(collection, 1), 100).unwrap();
        position.add_item(item(collection, 2), 100).unwrap();
        position.add_item(item(collection, 3), 100).unwrap();
        assert_eq!(position.total_collateral_value, 300);

        position.remove_item(&collection, 2).unwrap();
        let ids: Vec<u64> = position.collateral_items.iter().map(|i| i.item_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_duplicate_item_rejected() {
        let collection = Pubkey::new_unique();
        let mut position = BorrowerPosition::new(Pubkey::new_unique(), 0, 255);

        position.add_item(item(collection, 7), 50).unwrap();
        let err = position.add_item(item(collection, 7), 50).unwrap_err();
        assert_eq!(err, HubError::ItemAlreadyLocked.into());
    }

    #[test]
    fn test_capacity_limit_enforced() {
        let collection = Pubkey::new_unique();
        let mut position = BorrowerPosition::new(Pubkey::new_unique(), 0, 255);

        for id in 0..MAX_COLLATERAL_ITEMS as u64 {
            position.add_item(item(collection, id), 1).unwrap();
        }

        let err = position
            .add_item(item(collection, MAX_COLLATERAL_ITEMS as u64), 1)
            .unwrap_err();
        assert_eq!(err, HubError::CollateralLimitReached.into());
    }

    #[test]
    fn test_remove_unknown_item_rejected() {
        let collection = Pubkey::new_unique();
        let mut position = BorrowerPosition::new(Pubkey::new_unique(), 0, 255);

        let err = position.remove_item(&collection, 9).unwrap_err();
        assert_eq!(err, HubError::ItemNotLockedByCaller.into());
    }

    #[test]
    fn test_debt_without_collateral_fails_validation() {
        let mut position = BorrowerPosition::new(Pubkey::new_unique(), 0, 255);
        position.borrowed_amount = 10;
        assert!(position.validate().is_err());
    }
}
