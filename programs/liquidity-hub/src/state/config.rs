use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{program_error::ProgramError, pubkey::Pubkey};

use crate::{
    constants::{
        BPS_DENOMINATOR, DEFAULT_BORROWING_LIMIT_BPS, DEFAULT_BORROWING_RATE_BPS,
        DEFAULT_LENDING_RATE_BPS, DEFAULT_THRESHOLD_BPS, HUB_CONFIG_SEED,
    },
    error::HubError,
};

/// Protocol configuration, read at the top of every operation
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct HubConfig {
    /// Account discriminator
    pub discriminator: [u8; 8],

    /// Is initialized flag
    pub is_initialized: bool,

    /// Authority that can update parameters and resolve defaults
    pub authority: Pubkey,

    /// Destination for seized collateral
    pub treasury: Pubkey,

    /// Settlement asset mint (6 decimal stable asset)
    pub settlement_mint: Pubkey,

    /// Annual rate paid to lenders, basis points
    pub lending_rate_bps: u16,

    /// Annual rate charged to borrowers, basis points
    pub borrowing_rate_bps: u16,

    /// Loan-to-value cap on new borrows, basis points of collateral value
    pub borrowing_limit_bps: u16,

    /// Health level at or below which a position can be defaulted
    pub default_threshold_bps: u16,

    /// Blocks every user mutation while set
    pub paused: bool,

    /// Last update timestamp
    pub last_update: i64,

    /// PDA bump
    pub bump: u8,
}

impl HubConfig {
    pub const DISCRIMINATOR: [u8; 8] = [72, 85, 66, 67, 79, 78, 70, 71]; // "HUBCONFG"

    pub const LEN: usize = 8 + // discriminator
        1 + // is_initialized
        32 + // authority
        32 + // treasury
        32 + // settlement_mint
        2 + // lending_rate_bps
        2 + // borrowing_rate_bps
        2 + // borrowing_limit_bps
        2 + // default_threshold_bps
        1 + // paused
        8 + // last_update
        1 + // bump
        64; // padding for growth

    /// Create a configuration with the protocol launch parameters
    pub fn new(authority: Pubkey, treasury: Pubkey, settlement_mint: Pubkey, bump: u8) -> Self {
        Self {
            discriminator: Self::DISCRIMINATOR,
            is_initialized: true,
            authority,
            treasury,
            settlement_mint,
            lending_rate_bps: DEFAULT_LENDING_RATE_BPS,
            borrowing_rate_bps: DEFAULT_BORROWING_RATE_BPS,
            borrowing_limit_bps: DEFAULT_BORROWING_LIMIT_BPS,
            default_threshold_bps: DEFAULT_THRESHOLD_BPS,
            paused: false,
            last_update: 0,
            bump,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ProgramError> {
        if self.discriminator != Self::DISCRIMINATOR {
            return Err(HubError::InvalidAccountData.into());
        }

        if !self.is_initialized {
            return Err(HubError::NotInitialized.into());
        }

        // Ratio parameters are fractions of collateral value; the rate
        // parameters may legitimately exceed 100% APR
        if self.borrowing_limit_bps as u64 > BPS_DENOMINATOR {
            return Err(HubError::ParameterOutOfRange.into());
        }

        if self.default_threshold_bps as u64 > BPS_DENOMINATOR {
            return Err(HubError::ParameterOutOfRange.into());
        }

        Ok(())
    }
}

/// Derive the hub config PDA
pub fn find_hub_config_address(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[HUB_CONFIG_SEED], program_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_config_uses_launch_parameters() {
        let config = HubConfig::new(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            254,
        );

        assert_eq!(config.lending_rate_bps, 300);
        assert_eq!(config.borrowing_rate_bps, 600);
        assert_eq!(config.borrowing_limit_bps, 4_000);
        assert_eq!(config.default_threshold_bps, 5_000);
        assert!(!config.paused);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_ratio_over_full() {
        let mut config = HubConfig::new(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            254,
        );

        config.borrowing_limit_bps = 10_001;
        assert!(config.validate().is_err());

        config.borrowing_limit_bps = 10_000;
        config.default_threshold_bps = 10_001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_allows_rates_past_full_apr() {
        let mut config = HubConfig::new(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            254,
        );

        config.borrowing_rate_bps = 20_000;
        config.lending_rate_bps = 20_000;
        assert!(config.validate().is_ok());
    }
}
