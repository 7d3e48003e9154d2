use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{program_error::ProgramError, pubkey::Pubkey};

use crate::{
    constants::{COLLECTION_SEED, MAX_URI_LENGTH},
    error::HubError,
};

/// Reference valuation and status for one accepted NFT collection
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct CollectionConfig {
    /// Account discriminator
    pub discriminator: [u8; 8],

    /// Is initialized flag
    pub is_initialized: bool,

    /// Collection address this entry prices
    pub collection: Pubkey,

    /// Reference value per item, settlement asset base units
    pub unit_price: u64,

    /// Collection supply cap
    pub max_supply: u64,

    /// Items known to exist
    pub current_supply: u64,

    /// Project metadata URI
    pub project_uri: String,

    /// Whether items of this collection are accepted as collateral
    pub enabled: bool,

    /// Last update timestamp
    pub last_update: i64,

    /// PDA bump
    pub bump: u8,
}

impl CollectionConfig {
    pub const DISCRIMINATOR: [u8; 8] = [67, 79, 76, 76, 67, 70, 71, 95]; // "COLLCFG_"

    pub const LEN: usize = 8 + // discriminator
        1 + // is_initialized
        32 + // collection
        8 + // unit_price
        8 + // max_supply
        8 + // current_supply
        4 + MAX_URI_LENGTH + // project_uri
        1 + // enabled
        8 + // last_update
        1 + // bump
        32; // padding for growth

    pub fn new(
        collection: Pubkey,
        unit_price: u64,
        max_supply: u64,
        project_uri: String,
        now: i64,
        bump: u8,
    ) -> Result<Self, ProgramError> {
        if unit_price == 0 {
            return Err(HubError::InvalidAmount.into());
        }

        if project_uri.len() > MAX_URI_LENGTH {
            return Err(HubError::UriTooLong.into());
        }

        Ok(Self {
            discriminator: Self::DISCRIMINATOR,
            is_initialized: true,
            collection,
            unit_price,
            max_supply,
            current_supply: 0,
            project_uri,
            enabled: true,
            last_update: now,
            bump,
        })
    }

    /// Validate collection entry
    pub fn validate(&self) -> Result<(), ProgramError> {
        if self.discriminator != Self::DISCRIMINATOR {
            return Err(HubError::InvalidAccountData.into());
        }

        if !self.is_initialized {
            return Err(HubError::NotInitialized.into());
        }

        if self.current_supply > self.max_supply {
            return Err(HubError::ParameterOutOfRange.into());
        }

        Ok(())
    }

    /// True when items of this collection may be locked right now
    pub fn accepts_collateral(&self) -> bool {
        self.enabled && self.unit_price > 0
    }
}

/// Derive a collection config PDA
pub fn find_collection_address(program_id: &Pubkey, collection: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[COLLECTION_SEED, collection.as_ref()], program_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_collection_is_enabled() {
        let config = CollectionConfig::new(
            Pubkey::new_unique(),
            25_000_000,
            10_000,
            "ipfs://bafybeigdyrzt".to_string(),
            0,
            255,
        )
        .unwrap();

        assert!(config.accepts_collateral());
        assert_eq!(config.current_supply, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_price_rejected() {
        let result = CollectionConfig::new(
            Pubkey::new_unique(),
            0,
            10_000,
            String::new(),
            0,
            255,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_uri_length_capped() {
        let result = CollectionConfig::new(
            Pubkey::new_unique(),
            1,
            10,
            "x".repeat(MAX_URI_LENGTH + 1),
            0,
            255,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_disabled_collection_rejects_collateral() {
        let mut config = CollectionConfig::new(
            Pubkey::new_unique(),
            100,
            10,
            String::new(),
            0,
            255,
        )
        .unwrap();

        config.enabled = false;
        assert!(!config.accepts_collateral());
    }

    #[test]
    fn test_supply_over_cap_fails_validation() {
        let mut config = CollectionConfig::new(
            Pubkey::new_unique(),
            100,
            10,
            String::new(),
            0,
            255,
        )
        .unwrap();

        config.current_supply = 11;
        assert!(config.validate().is_err());
    }
}
