pub mod borrower;
pub mod collection;
pub mod config;
pub mod lender;
pub mod lock_record;
pub mod pool;

pub use borrower::*;
pub use collection::*;
pub use config::*;
pub use lender::*;
pub use lock_record::*;
pub use pool::*;

use arrayref::array_ref;
use solana_program::program_error::ProgramError;

use crate::error::HubError;

/// Read the 8-byte discriminator prefix of raw account data and check
/// it against the expected account type tag.
pub fn check_discriminator(data: &[u8], expected: &[u8; 8]) -> Result<(), ProgramError> {
    if data.len() < 8 {
        return Err(HubError::InvalidAccountData.into());
    }

    if array_ref![data, 0, 8] != expected {
        return Err(HubError::InvalidAccountData.into());
    }

    Ok(())
}
