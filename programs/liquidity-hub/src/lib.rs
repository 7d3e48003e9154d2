use solana_program::entrypoint;

pub mod constants;
pub mod error;
pub mod instruction;
pub mod interest;
pub mod ledger;
pub mod processor;
pub mod state;

// Program ID
solana_program::declare_id!("LiqHub1111111111111111111111111111111111111");

pub use crate::processor::process_instruction;

// Program entrypoint
#[cfg(not(feature = "no-entrypoint"))]
entrypoint!(process_instruction);
