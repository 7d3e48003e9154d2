use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
};

use crate::state::CollateralItemRef;

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub enum HubInstruction {
    /// Initialize the hub config and pool with launch parameters
    /// Accounts:
    /// 0. `[signer, writable]` Authority (funds the new accounts)
    /// 1. `[writable]` Hub config PDA
    /// 2. `[writable]` Hub pool PDA
    /// 3. `[]` Treasury
    /// 4. `[]` Settlement asset mint
    /// 5. `[]` System program
    InitializeHub,

    /// Deposit settlement asset into the pool
    /// Accounts:
    /// 0. `[signer, writable]` Lender (funds the position on first deposit)
    /// 1. `[]` Hub config PDA
    /// 2. `[writable]` Hub pool PDA
    /// 3. `[writable]` Lender position PDA
    /// 4. `[]` System program
    Deposit { amount: u64 },

    /// Withdraw deposited principal
    /// Accounts:
    /// 0. `[signer]` Lender
    /// 1. `[]` Hub config PDA
    /// 2. `[writable]` Hub pool PDA
    /// 3. `[writable]` Lender position PDA
    Withdraw { amount: u64 },

    /// Pay out all interest accumulated by a lender
    /// Accounts:
    /// 0. `[signer]` Lender
    /// 1. `[]` Hub config PDA
    /// 2. `[writable]` Hub pool PDA
    /// 3. `[writable]` Lender position PDA
    HarvestInterest,

    /// Lock a batch of collateral items
    /// Accounts:
    /// 0. `[signer, writable]` Borrower (funds new PDAs)
    /// 1. `[]` Hub config PDA
    /// 2. `[writable]` Borrower position PDA
    /// 3. `[]` System program
    /// 4+. Per item, in order: `[]` collection config PDA,
    ///     `[writable]` lock record PDA
    LockCollateral { items: Vec<CollateralItemRef> },

    /// Unlock a batch of collateral items held by the caller
    /// Accounts:
    /// 0. `[signer]` Borrower
    /// 1. `[]` Hub config PDA
    /// 2. `[writable]` Hub pool PDA
    /// 3. `[writable]` Borrower position PDA
    /// 4+. Per item, in order: `[]` collection config PDA,
    ///     `[writable]` lock record PDA
    UnlockCollateral { items: Vec<CollateralItemRef> },

    /// Borrow against locked collateral
    /// Accounts:
    /// 0. `[signer]` Borrower
    /// 1. `[]` Hub config PDA
    /// 2. `[writable]` Hub pool PDA
    /// 3. `[writable]` Borrower position PDA
    Borrow { amount: u64 },

    /// Repay outstanding debt, clamped to the amount owed
    /// Accounts:
    /// 0. `[signer]` Borrower
    /// 1. `[]` Hub config PDA
    /// 2. `[writable]` Hub pool PDA
    /// 3. `[writable]` Borrower position PDA
    Repay { amount: u64 },

    /// Seize an unhealthy position and send its collateral to the treasury
    /// Accounts:
    /// 0. `[signer]` Authority
    /// 1. `[]` Hub config PDA
    /// 2. `[writable]` Hub pool PDA
    /// 3. `[writable]` Borrower position PDA
    /// 4. `[]` Treasury
    /// 5+. `[writable]` Lock record PDA per locked item, in position order
    HandleDefault,

    /// Update protocol parameters
    /// Accounts:
    /// 0. `[signer]` Authority
    /// 1. `[writable]` Hub config PDA
    UpdateHubParameters {
        lending_rate_bps: Option<u16>,
        borrowing_rate_bps: Option<u16>,
        borrowing_limit_bps: Option<u16>,
        default_threshold_bps: Option<u16>,
    },

    /// Toggle the emergency pause
    /// Accounts:
    /// 0. `[signer]` Authority
    /// 1. `[writable]` Hub config PDA
    SetPaused { paused: bool },

    /// Point seized collateral at a new treasury
    /// Accounts:
    /// 0. `[signer]` Authority
    /// 1. `[writable]` Hub config PDA
    /// 2. `[]` New treasury
    SetTreasury,

    /// Register a collection as accepted collateral
    /// Accounts:
    /// 0. `[signer, writable]` Authority (funds the new PDA)
    /// 1. `[]` Hub config PDA
    /// 2. `[]` Collection address
    /// 3. `[writable]` Collection config PDA
    /// 4. `[]` System program
    RegisterCollection {
        unit_price: u64,
        max_supply: u64,
        project_uri: String,
    },

    /// Update a registered collection
    /// Accounts:
    /// 0. `[signer]` Authority
    /// 1. `[]` Hub config PDA
    /// 2. `[writable]` Collection config PDA
    UpdateCollection {
        unit_price: Option<u64>,
        enabled: Option<bool>,
        current_supply: Option<u64>,
        project_uri: Option<String>,
    },
}

impl HubInstruction {
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        let (&variant, rest) = input
            .split_first()
            .ok_or(ProgramError::InvalidInstructionData)?;

        Ok(match variant {
            0 => Self::InitializeHub,
            1 => {
                let payload = AmountPayload::try_from_slice(rest)?;
                Self::Deposit {
                    amount: payload.amount,
                }
            }
            2 => {
                let payload = AmountPayload::try_from_slice(rest)?;
                Self::Withdraw {
                    amount: payload.amount,
                }
            }
            3 => Self::HarvestInterest,
            4 => {
                let payload = ItemsPayload::try_from_slice(rest)?;
                Self::LockCollateral {
                    items: payload.items,
                }
            }
            5 => {
                let payload = ItemsPayload::try_from_slice(rest)?;
                Self::UnlockCollateral {
                    items: payload.items,
                }
            }
            6 => {
                let payload = AmountPayload::try_from_slice(rest)?;
                Self::Borrow {
                    amount: payload.amount,
                }
            }
            7 => {
                let payload = AmountPayload::try_from_slice(rest)?;
                Self::Repay {
                    amount: payload.amount,
                }
            }
            8 => Self::HandleDefault,
            9 => {
                let payload = UpdateHubParametersPayload::try_from_slice(rest)?;
                Self::UpdateHubParameters {
                    lending_rate_bps: payload.lending_rate_bps,
                    borrowing_rate_bps: payload.borrowing_rate_bps,
                    borrowing_limit_bps: payload.borrowing_limit_bps,
                    default_threshold_bps: payload.default_threshold_bps,
                }
            }
            10 => {
                let payload = SetPausedPayload::try_from_slice(rest)?;
                Self::SetPaused {
                    paused: payload.paused,
                }
            }
            11 => Self::SetTreasury,
            12 => {
                let payload = RegisterCollectionPayload::try_from_slice(rest)?;
                Self::RegisterCollection {
                    unit_price: payload.unit_price,
                    max_supply: payload.max_supply,
                    project_uri: payload.project_uri,
                }
            }
            13 => {
                let payload = UpdateCollectionPayload::try_from_slice(rest)?;
                Self::UpdateCollection {
                    unit_price: payload.unit_price,
                    enabled: payload.enabled,
                    current_supply: payload.current_supply,
                    project_uri: payload.project_uri,
                }
            }
            _ => return Err(ProgramError::InvalidInstructionData),
        })
    }
}

// Payload structs for instructions carrying data
#[derive(BorshSerialize, BorshDeserialize)]
struct AmountPayload {
    amount: u64,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct ItemsPayload {
    items: Vec<CollateralItemRef>,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct UpdateHubParametersPayload {
    lending_rate_bps: Option<u16>,
    borrowing_rate_bps: Option<u16>,
    borrowing_limit_bps: Option<u16>,
    default_threshold_bps: Option<u16>,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct SetPausedPayload {
    paused: bool,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct RegisterCollectionPayload {
    unit_price: u64,
    max_supply: u64,
    project_uri: String,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct UpdateCollectionPayload {
    unit_price: Option<u64>,
    enabled: Option<bool>,
    current_supply: Option<u64>,
    project_uri: Option<String>,
}

// Helper functions to create instructions
pub fn initialize_hub(
    program_id: &Pubkey,
    authority: &Pubkey,
    config_pda: &Pubkey,
    pool_pda: &Pubkey,
    treasury: &Pubkey,
    settlement_mint: &Pubkey,
) -> Instruction {
    let accounts = vec![
        AccountMeta::new(*authority, true),
        AccountMeta::new(*config_pda, false),
        AccountMeta::new(*pool_pda, false),
        AccountMeta::new_readonly(*treasury, false),
        AccountMeta::new_readonly(*settlement_mint, false),
        AccountMeta::new_readonly(solana_program::system_program::id(), false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data: HubInstruction::InitializeHub.try_to_vec().unwrap(),
    }
}

pub fn deposit(
    program_id: &Pubkey,
    lender: &Pubkey,
    config_pda: &Pubkey,
    pool_pda: &Pubkey,
    position_pda: &Pubkey,
    amount: u64,
) -> Instruction {
    let accounts = vec![
        AccountMeta::new(*lender, true),
        AccountMeta::new_readonly(*config_pda, false),
        AccountMeta::new(*pool_pda, false),
        AccountMeta::new(*position_pda, false),
        AccountMeta::new_readonly(solana_program::system_program::id(), false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data: HubInstruction::Deposit { amount }.try_to_vec().unwrap(),
    }
}

pub fn withdraw(
    program_id: &Pubkey,
    lender: &Pubkey,
    config_pda: &Pubkey,
    pool_pda: &Pubkey,
    position_pda: &Pubkey,
    amount: u64,
) -> Instruction {
    let accounts = vec![
        AccountMeta::new_readonly(*lender, true),
        AccountMeta::new_readonly(*config_pda, false),
        AccountMeta::new(*pool_pda, false),
        AccountMeta::new(*position_pda, false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data: HubInstruction::Withdraw { amount }.try_to_vec().unwrap(),
    }
}

pub fn harvest_interest(
    program_id: &Pubkey,
    lender: &Pubkey,
    config_pda: &Pubkey,
    pool_pda: &Pubkey,
    position_pda: &Pubkey,
) -> Instruction {
    let accounts = vec![
        AccountMeta::new_readonly(*lender, true),
        AccountMeta::new_readonly(*config_pda, false),
        AccountMeta::new(*pool_pda, false),
        AccountMeta::new(*position_pda, false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data: HubInstruction::HarvestInterest.try_to_vec().unwrap(),
    }
}

/// Build the per-item account tail shared by lock and unlock
fn collateral_account_pairs(
    program_id: &Pubkey,
    items: &[CollateralItemRef],
) -> Vec<AccountMeta> {
    let mut metas = Vec::with_capacity(items.len() * 2);
    for item in items {
        let (collection_pda, _) =
            crate::state::find_collection_address(program_id, &item.collection);
        let (lock_pda, _) =
            crate::state::find_lock_record_address(program_id, &item.collection, item.item_id);
        metas.push(AccountMeta::new_readonly(collection_pda, false));
        metas.push(AccountMeta::new(lock_pda, false));
    }
    metas
}

pub fn lock_collateral(
    program_id: &Pubkey,
    borrower: &Pubkey,
    config_pda: &Pubkey,
    position_pda: &Pubkey,
    items: Vec<CollateralItemRef>,
) -> Instruction {
    let mut accounts = vec![
        AccountMeta::new(*borrower, true),
        AccountMeta::new_readonly(*config_pda, false),
        AccountMeta::new(*position_pda, false),
        AccountMeta::new_readonly(solana_program::system_program::id(), false),
    ];
    accounts.extend(collateral_account_pairs(program_id, &items));

    Instruction {
        program_id: *program_id,
        accounts,
        data: HubInstruction::LockCollateral { items }.try_to_vec().unwrap(),
    }
}

pub fn unlock_collateral(
    program_id: &Pubkey,
    borrower: &Pubkey,
    config_pda: &Pubkey,
    pool_pda: &Pubkey,
    position_pda: &Pubkey,
    items: Vec<CollateralItemRef>,
) -> Instruction {
    let mut accounts = vec![
        AccountMeta::new_readonly(*borrower, true),
        AccountMeta::new_readonly(*config_pda, false),
        AccountMeta::new(*pool_pda, false),
        AccountMeta::new(*position_pda, false),
    ];
    accounts.extend(collateral_account_pairs(program_id, &items));

    Instruction {
        program_id: *program_id,
        accounts,
        data: HubInstruction::UnlockCollateral { items }.try_to_vec().unwrap(),
    }
}

pub fn borrow(
    program_id: &Pubkey,
    borrower: &Pubkey,
    config_pda: &Pubkey,
    pool_pda: &Pubkey,
    position_pda: &Pubkey,
    amount: u64,
) -> Instruction {
    let accounts = vec![
        AccountMeta::new_readonly(*borrower, true),
        AccountMeta::new_readonly(*config_pda, false),
        AccountMeta::new(*pool_pda, false),
        AccountMeta::new(*position_pda, false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data: HubInstruction::Borrow { amount }.try_to_vec().unwrap(),
    }
}

pub fn repay(
    program_id: &Pubkey,
    borrower: &Pubkey,
    config_pda: &Pubkey,
    pool_pda: &Pubkey,
    position_pda: &Pubkey,
    amount: u64,
) -> Instruction {
    let accounts = vec![
        AccountMeta::new_readonly(*borrower, true),
        AccountMeta::new_readonly(*config_pda, false),
        AccountMeta::new(*pool_pda, false),
        AccountMeta::new(*position_pda, false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data: HubInstruction::Repay { amount }.try_to_vec().unwrap(),
    }
}

pub fn handle_default(
    program_id: &Pubkey,
    authority: &Pubkey,
    config_pda: &Pubkey,
    pool_pda: &Pubkey,
    position_pda: &Pubkey,
    treasury: &Pubkey,
    locked_items: &[CollateralItemRef],
) -> Instruction {
    let mut accounts = vec![
        AccountMeta::new_readonly(*authority, true),
        AccountMeta::new_readonly(*config_pda, false),
        AccountMeta::new(*pool_pda, false),
        AccountMeta::new(*position_pda, false),
        AccountMeta::new_readonly(*treasury, false),
    ];
    for item in locked_items {
        let (lock_pda, _) =
            crate::state::find_lock_record_address(program_id, &item.collection, item.item_id);
        accounts.push(AccountMeta::new(lock_pda, false));
    }

    Instruction {
        program_id: *program_id,
        accounts,
        data: HubInstruction::HandleDefault.try_to_vec().unwrap(),
    }
}

pub fn update_hub_parameters(
    program_id: &Pubkey,
    authority: &Pubkey,
    config_pda: &Pubkey,
    lending_rate_bps: Option<u16>,
    borrowing_rate_bps: Option<u16>,
    borrowing_limit_bps: Option<u16>,
    default_threshold_bps: Option<u16>,
) -> Instruction {
    let accounts = vec![
        AccountMeta::new_readonly(*authority, true),
        AccountMeta::new(*config_pda, false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data: HubInstruction::UpdateHubParameters {
            lending_rate_bps,
            borrowing_rate_bps,
            borrowing_limit_bps,
            default_threshold_bps,
        }
        .try_to_vec()
        .unwrap(),
    }
}

pub fn set_lending_rate(
    program_id: &Pubkey,
    authority: &Pubkey,
    config_pda: &Pubkey,
    bps: u16,
) -> Instruction {
    update_hub_parameters(program_id, authority, config_pda, Some(bps), None, None, None)
}

pub fn set_borrowing_rate(
    program_id: &Pubkey,
    authority: &Pubkey,
    config_pda: &Pubkey,
    bps: u16,
) -> Instruction {
    update_hub_parameters(program_id, authority, config_pda, None, Some(bps), None, None)
}

pub fn set_borrowing_limit(
    program_id: &Pubkey,
    authority: &Pubkey,
    config_pda: &Pubkey,
    bps: u16,
) -> Instruction {
    update_hub_parameters(program_id, authority, config_pda, None, None, Some(bps), None)
}

pub fn set_default_threshold(
    program_id: &Pubkey,
    authority: &Pubkey,
    config_pda: &Pubkey,
    bps: u16,
) -> Instruction {
    update_hub_parameters(program_id, authority, config_pda, None, None, None, Some(bps))
}

pub fn set_paused(
    program_id: &Pubkey,
    authority: &Pubkey,
    config_pda: &Pubkey,
    paused: bool,
) -> Instruction {
    let accounts = vec![
        AccountMeta::new_readonly(*authority, true),
        AccountMeta::new(*config_pda, false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data: HubInstruction::SetPaused { paused }.try_to_vec().unwrap(),
    }
}

pub fn set_treasury(
    program_id: &Pubkey,
    authority: &Pubkey,
    config_pda: &Pubkey,
    new_treasury: &Pubkey,
) -> Instruction {
    let accounts = vec![
        AccountMeta::new_readonly(*authority, true),
        AccountMeta::new(*config_pda, false),
        AccountMeta::new_readonly(*new_treasury, false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data: HubInstruction::SetTreasury.try_to_vec().unwrap(),
    }
}

pub fn register_collection(
    program_id: &Pubkey,
    authority: &Pubkey,
    config_pda: &Pubkey,
    collection: &Pubkey,
    collection_pda: &Pubkey,
    unit_price: u64,
    max_supply: u64,
    project_uri: String,
) -> Instruction {
    let accounts = vec![
        AccountMeta::new(*authority, true),
        AccountMeta::new_readonly(*config_pda, false),
        AccountMeta::new_readonly(*collection, false),
        AccountMeta::new(*collection_pda, false),
        AccountMeta::new_readonly(solana_program::system_program::id(), false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data: HubInstruction::RegisterCollection {
            unit_price,
            max_supply,
            project_uri,
        }
        .try_to_vec()
        .unwrap(),
    }
}

pub fn update_collection(
    program_id: &Pubkey,
    authority: &Pubkey,
    config_pda: &Pubkey,
    collection_pda: &Pubkey,
    unit_price: Option<u64>,
    enabled: Option<bool>,
    current_supply: Option<u64>,
    project_uri: Option<String>,
) -> Instruction {
    let accounts = vec![
        AccountMeta::new_readonly(*authority, true),
        AccountMeta::new_readonly(*config_pda, false),
        AccountMeta::new(*collection_pda, false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data: HubInstruction::UpdateCollection {
            unit_price,
            enabled,
            current_supply,
            project_uri,
        }
        .try_to_vec()
        .unwrap(),
    }
}
