use solana_program::program_error::ProgramError;

use crate::{
    constants::BPS_DENOMINATOR,
    error::HubError,
    interest::InterestModel,
    state::{
        BorrowerPosition, CollateralItemRef, CollectionConfig, HubConfig, HubPool, LenderPosition,
        LockRecord,
    },
};

/// Outcome of a default resolution, for logging and settlement
#[derive(Debug, Clone, Copy)]
pub struct DefaultOutcome {
    /// Debt cleared from the pool, capitalized interest included
    pub debt_cleared: u64,
    /// Cached value of the seized collateral
    pub collateral_value: u64,
    /// Number of items seized
    pub items_seized: usize,
}

/// Position accounting core.
///
/// Every operation works on deserialized state and either succeeds
/// completely or leaves an error; callers persist the state only after
/// success, so a failed precondition never reaches the chain.
pub struct HubLedger;

impl HubLedger {
    /// Reject user mutations while the protocol is paused
    pub fn ensure_active(config: &HubConfig) -> Result<(), ProgramError> {
        if config.paused {
            return Err(HubError::Paused.into());
        }
        Ok(())
    }

    /// Capitalize interest accrued since the borrower's last checkpoint.
    ///
    /// Accrued interest joins the principal on both the position and the
    /// pool counter, keeping `total_borrowed` equal to the sum of
    /// borrower principals at all times.
    pub fn checkpoint_borrower(
        config: &HubConfig,
        pool: &mut HubPool,
        position: &mut BorrowerPosition,
        now: i64,
    ) -> Result<(), ProgramError> {
        let pending = InterestModel::accrue(
            position.borrowed_amount,
            position.last_update_time,
            now,
            config.borrowing_rate_bps,
        )?;

        if pending > 0 {
            position.borrowed_amount = position
                .borrowed_amount
                .checked_add(pending)
                .ok_or(HubError::ArithmeticOverflow)?;
            pool.add_borrowed(pending)?;
        }
        position.last_update_time = position.last_update_time.max(now);

        Ok(())
    }

    /// Add liquidity to the pool under the lender's position
    pub fn deposit(
        config: &HubConfig,
        pool: &mut HubPool,
        position: &mut LenderPosition,
        amount: u64,
        now: i64,
    ) -> Result<(), ProgramError> {
        Self::ensure_active(config)?;

        if amount == 0 {
            return Err(HubError::InvalidAmount.into());
        }

        position.checkpoint(now, config.lending_rate_bps)?;

        position.amount = position
            .amount
            .checked_add(amount)
            .ok_or(HubError::ArithmeticOverflow)?;
        pool.add_deposited(amount)?;

        Ok(())
    }

    /// Withdraw principal, subject to unborrowed liquidity
    pub fn withdraw(
        config: &HubConfig,
        pool: &mut HubPool,
        position: &mut LenderPosition,
        amount: u64,
        now: i64,
    ) -> Result<(), ProgramError> {
        Self::ensure_active(config)?;

        position.checkpoint(now, config.lending_rate_bps)?;

        if amount == 0 {
            return Err(HubError::InvalidAmount.into());
        }

        if amount > position.amount {
            return Err(HubError::InsufficientBalance.into());
        }

        if amount > pool.available_liquidity() {
            return Err(HubError::InsufficientLiquidity.into());
        }

        position.amount = position
            .amount
            .checked_sub(amount)
            .ok_or(HubError::ArithmeticOverflow)?;
        pool.remove_deposited(amount)?;

        Ok(())
    }

    /// Pay out all interest accumulated so far, returning the payout
    pub fn harvest_interest(
        config: &HubConfig,
        pool: &mut HubPool,
        position: &mut LenderPosition,
        now: i64,
    ) -> Result<u64, ProgramError> {
        Self::ensure_active(config)?;

        position.checkpoint(now, config.lending_rate_bps)?;

        let payout = position.accumulated_interest;
        position.accumulated_interest = 0;
        pool.record_interest_paid(payout)?;

        Ok(payout)
    }

    /// Lock one collateral item under the borrower's position
    pub fn lock_item(
        config: &HubConfig,
        collection: &CollectionConfig,
        position: &mut BorrowerPosition,
        lock: &mut LockRecord,
        item: CollateralItemRef,
        now: i64,
    ) -> Result<(), ProgramError> {
        Self::ensure_active(config)?;

        if collection.collection != item.collection
            || lock.collection != item.collection
            || lock.item_id != item.item_id
        {
            return Err(HubError::InvalidAccountData.into());
        }

        if !collection.accepts_collateral() {
            return Err(HubError::CollectionNotSupported.into());
        }

        lock.acquire(position.owner, now)?;
        position.add_item(item, collection.unit_price)?;

        Ok(())
    }

    /// Release one collateral item, returning its current valuation.
    ///
    /// The caller prices the whole removal batch and settles the value
    /// cache through `settle_unlock` once all items are out.
    pub fn unlock_item(
        config: &HubConfig,
        collection: &CollectionConfig,
        position: &mut BorrowerPosition,
        lock: &mut LockRecord,
        item: CollateralItemRef,
    ) -> Result<u64, ProgramError> {
        Self::ensure_active(config)?;

        if collection.collection != item.collection
            || lock.collection != item.collection
            || lock.item_id != item.item_id
        {
            return Err(HubError::InvalidAccountData.into());
        }

        lock.release(&position.owner)?;
        position.remove_item(&item.collection, item.item_id)?;

        Ok(collection.unit_price)
    }

    /// Settle the value cache after a removal batch and enforce that any
    /// outstanding loan stays within the borrowing limit.
    ///
    /// `value_removed` is priced at current collection values, so it can
    /// exceed the cached total when prices moved; it is clamped before
    /// the subtraction rather than allowed to underflow.
    pub fn settle_unlock(
        config: &HubConfig,
        position: &mut BorrowerPosition,
        value_removed: u64,
    ) -> Result<(), ProgramError> {
        let clamped = value_removed.min(position.total_collateral_value);
        let mut remaining = position
            .total_collateral_value
            .checked_sub(clamped)
            .ok_or(HubError::ArithmeticOverflow)?;

        if position.collateral_items.is_empty() {
            remaining = 0;
        }

        if position.borrowed_amount > 0 {
            let supported = Self::limit_for_value(remaining, config.borrowing_limit_bps)?;
            if position.borrowed_amount > supported {
                return Err(HubError::CollateralRequiredForOutstandingLoan.into());
            }
        }

        position.total_collateral_value = remaining;
        Ok(())
    }

    /// Draw credit against locked collateral
    pub fn borrow(
        config: &HubConfig,
        pool: &mut HubPool,
        position: &mut BorrowerPosition,
        amount: u64,
        now: i64,
    ) -> Result<(), ProgramError> {
        Self::ensure_active(config)?;

        if amount == 0 {
            return Err(HubError::InvalidAmount.into());
        }

        Self::checkpoint_borrower(config, pool, position, now)?;

        let borrowed_after = position
            .borrowed_amount
            .checked_add(amount)
            .ok_or(HubError::ArithmeticOverflow)?;

        let limit =
            Self::limit_for_value(position.total_collateral_value, config.borrowing_limit_bps)?;
        if borrowed_after > limit {
            return Err(HubError::ExceedsBorrowingLimit.into());
        }

        if amount > pool.available_liquidity() {
            return Err(HubError::InsufficientLiquidity.into());
        }

        position.borrowed_amount = borrowed_after;
        pool.add_borrowed(amount)?;

        Ok(())
    }

    /// Repay debt. Amounts past the outstanding balance are clamped, so
    /// paying "everything and then some" settles the loan exactly.
    /// Returns the amount actually applied.
    pub fn repay(
        config: &HubConfig,
        pool: &mut HubPool,
        position: &mut BorrowerPosition,
        amount: u64,
        now: i64,
    ) -> Result<u64, ProgramError> {
        Self::ensure_active(config)?;

        if amount == 0 {
            return Err(HubError::InvalidAmount.into());
        }

        Self::checkpoint_borrower(config, pool, position, now)?;

        let effective = amount.min(position.borrowed_amount);
        position.borrowed_amount = position
            .borrowed_amount
            .checked_sub(effective)
            .ok_or(HubError::ArithmeticOverflow)?;
        pool.remove_borrowed(effective)?;

        Ok(effective)
    }

    /// Seize an unhealthy position. Authority gating is the processor's
    /// job; the ledger enforces only the health condition.
    ///
    /// Clears the position entirely, so the borrower keeps no residual
    /// debt once collateral is gone. Runs while paused.
    pub fn handle_default(
        config: &HubConfig,
        pool: &mut HubPool,
        position: &mut BorrowerPosition,
        now: i64,
    ) -> Result<DefaultOutcome, ProgramError> {
        Self::checkpoint_borrower(config, pool, position, now)?;

        if position.borrowed_amount == 0 {
            return Err(HubError::PositionHealthy.into());
        }

        let health = Self::loan_health(config, position, now)?;
        if health > config.default_threshold_bps as u64 {
            return Err(HubError::PositionHealthy.into());
        }

        let outcome = DefaultOutcome {
            debt_cleared: position.borrowed_amount,
            collateral_value: position.total_collateral_value,
            items_seized: position.collateral_items.len(),
        };

        pool.remove_borrowed(position.borrowed_amount)?;
        pool.total_defaults = pool
            .total_defaults
            .checked_add(1)
            .ok_or(HubError::ArithmeticOverflow)?;
        position.clear();

        Ok(outcome)
    }

    /// Interest a lender could harvest right now, accrual included
    pub fn current_earned_interest(
        config: &HubConfig,
        position: &LenderPosition,
        now: i64,
    ) -> Result<u64, ProgramError> {
        let pending = InterestModel::accrue(
            position.amount,
            position.last_update_time,
            now,
            config.lending_rate_bps,
        )?;

        position
            .accumulated_interest
            .checked_add(pending)
            .ok_or_else(|| HubError::ArithmeticOverflow.into())
    }

    /// Full amount settling the loan right now, accrual included.
    /// Repaying exactly this value at the same instant zeroes the debt.
    pub fn total_owed(
        config: &HubConfig,
        position: &BorrowerPosition,
        now: i64,
    ) -> Result<u64, ProgramError> {
        let pending = InterestModel::accrue(
            position.borrowed_amount,
            position.last_update_time,
            now,
            config.borrowing_rate_bps,
        )?;

        position
            .borrowed_amount
            .checked_add(pending)
            .ok_or_else(|| HubError::ArithmeticOverflow.into())
    }

    /// Collateral value relative to debt, in basis points. A debt-free
    /// position reports `u64::MAX`.
    pub fn loan_health(
        config: &HubConfig,
        position: &BorrowerPosition,
        now: i64,
    ) -> Result<u64, ProgramError> {
        let owed = Self::total_owed(config, position, now)?;
        if owed == 0 {
            return Ok(u64::MAX);
        }

        let health =
            (position.total_collateral_value as u128 * BPS_DENOMINATOR as u128) / owed as u128;
        Ok(u64::try_from(health).unwrap_or(u64::MAX))
    }

    /// Largest total debt the position's collateral can support
    pub fn max_borrowable(
        config: &HubConfig,
        position: &BorrowerPosition,
    ) -> Result<u64, ProgramError> {
        Self::limit_for_value(position.total_collateral_value, config.borrowing_limit_bps)
    }

    /// Whether a lock record currently holds its item
    pub fn is_item_locked(lock: &LockRecord) -> bool {
        lock.is_locked
    }

    fn limit_for_value(collateral_value: u64, limit_bps: u16) -> Result<u64, ProgramError> {
        let limit = (collateral_value as u128 * limit_bps as u128) / BPS_DENOMINATOR as u128;
        u64::try_from(limit).map_err(|_| HubError::ArithmeticOverflow.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SECONDS_PER_YEAR;
    use solana_program::pubkey::Pubkey;

    fn config() -> HubConfig {
        HubConfig::new(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            255,
        )
    }

    #[test]
    fn test_borrower_checkpoint_capitalizes_into_pool_counter() {
        let config = config();
        let mut pool = HubPool::new(255);
        let mut position = BorrowerPosition::new(Pubkey::new_unique(), 0, 255);

        pool.add_deposited(10_000_000).unwrap();
        position.collateral_items.push(CollateralItemRef {
            collection: Pubkey::new_unique(),
            item_id: 1,
        });
        position.total_collateral_value = 5_000_000;

        HubLedger::borrow(&config, &mut pool, &mut position, 1_000_000, 0).unwrap();
        assert_eq!(pool.total_borrowed, 1_000_000);

        let year = SECONDS_PER_YEAR as i64;
        HubLedger::checkpoint_borrower(&config, &mut pool, &mut position, year).unwrap();

        // 6% over a year: base 60_000, x1.18 compounding, x1.5 duration
        assert_eq!(position.borrowed_amount, 1_106_200);
        assert_eq!(pool.total_borrowed, position.borrowed_amount);
    }

    #[test]
    fn test_loan_health_sentinel_without_debt() {
        let config = config();
        let position = BorrowerPosition::new(Pubkey::new_unique(), 0, 255);
        assert_eq!(HubLedger::loan_health(&config, &position, 0).unwrap(), u64::MAX);
    }

    #[test]
    fn test_settle_unlock_clamps_value_removed() {
        let config = config();
        let mut position = BorrowerPosition::new(Pubkey::new_unique(), 0, 255);
        position.total_collateral_value = 100;

        // Batch priced above the cache must drain it, not underflow
        HubLedger::settle_unlock(&config, &mut position, 150).unwrap();
        assert_eq!(position.total_collateral_value, 0);
    }
}
