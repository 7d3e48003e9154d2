use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program::invoke_signed,
    program_error::ProgramError,
    program_pack::Pack,
    pubkey::Pubkey,
    system_instruction,
    sysvar::{clock::Clock, rent::Rent, Sysvar},
};
use spl_token::state::Mint;

use crate::{
    constants::{
        BORROWER_POSITION_SEED, COLLECTION_SEED, HUB_CONFIG_SEED, HUB_POOL_SEED,
        LENDER_POSITION_SEED, LOCK_RECORD_SEED, MAX_URI_LENGTH, SETTLEMENT_DECIMALS,
    },
    error::HubError,
    instruction::HubInstruction,
    ledger::HubLedger,
    state::{
        check_discriminator, find_borrower_position_address, find_collection_address,
        find_hub_config_address, find_hub_pool_address, find_lender_position_address,
        find_lock_record_address, BorrowerPosition, CollateralItemRef, CollectionConfig,
        HubConfig, HubPool, LenderPosition, LockRecord,
    },
};

pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    let instruction = HubInstruction::unpack(instruction_data)?;

    match instruction {
        HubInstruction::InitializeHub => {
            msg!("Instruction: InitializeHub");
            process_initialize_hub(program_id, accounts)
        }

        HubInstruction::Deposit { amount } => {
            msg!("Instruction: Deposit");
            process_deposit(program_id, accounts, amount)
        }

        HubInstruction::Withdraw { amount } => {
            msg!("Instruction: Withdraw");
            process_withdraw(program_id, accounts, amount)
        }

        HubInstruction::HarvestInterest => {
            msg!("Instruction: HarvestInterest");
            process_harvest_interest(program_id, accounts)
        }

        HubInstruction::LockCollateral { items } => {
            msg!("Instruction: LockCollateral");
            process_lock_collateral(program_id, accounts, items)
        }

        HubInstruction::UnlockCollateral { items } => {
            msg!("Instruction: UnlockCollateral");
            process_unlock_collateral(program_id, accounts, items)
        }

        HubInstruction::Borrow { amount } => {
            msg!("Instruction: Borrow");
            process_borrow(program_id, accounts, amount)
        }

        HubInstruction::Repay { amount } => {
            msg!("Instruction: Repay");
            process_repay(program_id, accounts, amount)
        }

        HubInstruction::HandleDefault => {
            msg!("Instruction: HandleDefault");
            process_handle_default(program_id, accounts)
        }

        HubInstruction::UpdateHubParameters {
            lending_rate_bps,
            borrowing_rate_bps,
            borrowing_limit_bps,
            default_threshold_bps,
        } => {
            msg!("Instruction: UpdateHubParameters");
            process_update_hub_parameters(
                program_id,
                accounts,
                lending_rate_bps,
                borrowing_rate_bps,
                borrowing_limit_bps,
                default_threshold_bps,
            )
        }

        HubInstruction::SetPaused { paused } => {
            msg!("Instruction: SetPaused");
            process_set_paused(program_id, accounts, paused)
        }

        HubInstruction::SetTreasury => {
            msg!("Instruction: SetTreasury");
            process_set_treasury(program_id, accounts)
        }

        HubInstruction::RegisterCollection {
            unit_price,
            max_supply,
            project_uri,
        } => {
            msg!("Instruction: RegisterCollection");
            process_register_collection(program_id, accounts, unit_price, max_supply, project_uri)
        }

        HubInstruction::UpdateCollection {
            unit_price,
            enabled,
            current_supply,
            project_uri,
        } => {
            msg!("Instruction: UpdateCollection");
            process_update_collection(
                program_id,
                accounts,
                unit_price,
                enabled,
                current_supply,
                project_uri,
            )
        }
    }
}

/// Deserialize account state, tolerating the zero padding that trails
/// the borsh payload in fixed-size accounts.
fn load_state<T: BorshDeserialize>(data: &[u8]) -> Result<T, ProgramError> {
    let mut cursor: &[u8] = data;
    T::deserialize(&mut cursor).map_err(|_| ProgramError::InvalidAccountData)
}

fn load_account<T: BorshDeserialize>(
    program_id: &Pubkey,
    info: &AccountInfo,
    discriminator: &[u8; 8],
) -> Result<T, ProgramError> {
    if info.owner != program_id {
        return Err(ProgramError::IncorrectProgramId);
    }

    let data = info.try_borrow_data()?;
    check_discriminator(&data, discriminator)?;
    load_state(&data)
}

fn create_pda_account<'a>(
    payer: &AccountInfo<'a>,
    new_account: &AccountInfo<'a>,
    system_program: &AccountInfo<'a>,
    program_id: &Pubkey,
    space: usize,
    signer_seeds: &[&[u8]],
) -> ProgramResult {
    if *system_program.key != solana_program::system_program::id() {
        return Err(ProgramError::IncorrectProgramId);
    }

    let rent = Rent::get()?;
    let lamports = rent.minimum_balance(space);

    invoke_signed(
        &system_instruction::create_account(
            payer.key,
            new_account.key,
            lamports,
            space as u64,
            program_id,
        ),
        &[payer.clone(), new_account.clone(), system_program.clone()],
        &[signer_seeds],
    )
}

fn process_initialize_hub(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let authority_info = next_account_info(account_info_iter)?;
    let config_info = next_account_info(account_info_iter)?;
    let pool_info = next_account_info(account_info_iter)?;
    let treasury_info = next_account_info(account_info_iter)?;
    let mint_info = next_account_info(account_info_iter)?;
    let system_program = next_account_info(account_info_iter)?;

    if !authority_info.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    let (config_pubkey, config_bump) = find_hub_config_address(program_id);
    if config_pubkey != *config_info.key {
        return Err(HubError::InvalidPda.into());
    }

    let (pool_pubkey, pool_bump) = find_hub_pool_address(program_id);
    if pool_pubkey != *pool_info.key {
        return Err(HubError::InvalidPda.into());
    }

    if config_info.owner == program_id || pool_info.owner == program_id {
        return Err(HubError::AlreadyInitialized.into());
    }

    // The pool settles in exactly one SPL token with the expected scale
    if mint_info.owner != &spl_token::id() {
        return Err(ProgramError::IncorrectProgramId);
    }
    let mint = Mint::unpack(&mint_info.try_borrow_data()?)?;
    if mint.decimals != SETTLEMENT_DECIMALS {
        return Err(HubError::ParameterOutOfRange.into());
    }

    create_pda_account(
        authority_info,
        config_info,
        system_program,
        program_id,
        HubConfig::LEN,
        &[HUB_CONFIG_SEED, &[config_bump]],
    )?;

    create_pda_account(
        authority_info,
        pool_info,
        system_program,
        program_id,
        HubPool::LEN,
        &[HUB_POOL_SEED, &[pool_bump]],
    )?;

    let now = Clock::get()?.unix_timestamp;

    let mut config = HubConfig::new(
        *authority_info.key,
        *treasury_info.key,
        *mint_info.key,
        config_bump,
    );
    config.last_update = now;
    config.validate()?;
    config.serialize(&mut &mut config_info.data.borrow_mut()[..])?;

    let mut pool = HubPool::new(pool_bump);
    pool.last_update = now;
    pool.serialize(&mut &mut pool_info.data.borrow_mut()[..])?;

    msg!(
        "Liquidity hub initialized, settling in mint {} ({} decimals)",
        mint_info.key,
        mint.decimals
    );
    Ok(())
}

fn process_deposit(program_id: &Pubkey, accounts: &[AccountInfo], amount: u64) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let lender_info = next_account_info(account_info_iter)?;
    let config_info = next_account_info(account_info_iter)?;
    let pool_info = next_account_info(account_info_iter)?;
    let position_info = next_account_info(account_info_iter)?;
    let system_program_info = account_info_iter.next();

    if !lender_info.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    let config: HubConfig = load_account(program_id, config_info, &HubConfig::DISCRIMINATOR)?;
    config.validate()?;
    HubLedger::ensure_active(&config)?;

    let mut pool: HubPool = load_account(program_id, pool_info, &HubPool::DISCRIMINATOR)?;
    pool.validate()?;

    let (position_pubkey, position_bump) =
        find_lender_position_address(program_id, lender_info.key);
    if position_pubkey != *position_info.key {
        return Err(HubError::InvalidPda.into());
    }

    let now = Clock::get()?.unix_timestamp;

    // Create the position on first deposit (clients can't create PDAs directly).
    let mut position = if position_info.owner != program_id {
        let system_program_info =
            system_program_info.ok_or(ProgramError::NotEnoughAccountKeys)?;

        create_pda_account(
            lender_info,
            position_info,
            system_program_info,
            program_id,
            LenderPosition::LEN,
            &[
                LENDER_POSITION_SEED,
                lender_info.key.as_ref(),
                &[position_bump],
            ],
        )?;

        LenderPosition::new(*lender_info.key, now, position_bump)
    } else {
        let position: LenderPosition =
            load_account(program_id, position_info, &LenderPosition::DISCRIMINATOR)?;
        position.validate()?;

        if position.owner != *lender_info.key {
            return Err(HubError::Unauthorized.into());
        }
        position
    };

    HubLedger::deposit(&config, &mut pool, &mut position, amount, now)?;

    position.serialize(&mut &mut position_info.data.borrow_mut()[..])?;
    pool.serialize(&mut &mut pool_info.data.borrow_mut()[..])?;

    msg!("Deposited {} for {}", amount, lender_info.key);
    // In production, would pull the settlement tokens into the pool vault
    Ok(())
}

fn process_withdraw(program_id: &Pubkey, accounts: &[AccountInfo], amount: u64) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let lender_info = next_account_info(account_info_iter)?;
    let config_info = next_account_info(account_info_iter)?;
    let pool_info = next_account_info(account_info_iter)?;
    let position_info = next_account_info(account_info_iter)?;

    if !lender_info.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    let config: HubConfig = load_account(program_id, config_info, &HubConfig::DISCRIMINATOR)?;
    config.validate()?;

    let mut pool: HubPool = load_account(program_id, pool_info, &HubPool::DISCRIMINATOR)?;
    pool.validate()?;

    let (position_pubkey, _) = find_lender_position_address(program_id, lender_info.key);
    if position_pubkey != *position_info.key {
        return Err(HubError::InvalidPda.into());
    }
    if position_info.owner != program_id {
        return Err(HubError::NotInitialized.into());
    }

    let mut position: LenderPosition =
        load_account(program_id, position_info, &LenderPosition::DISCRIMINATOR)?;
    position.validate()?;

    if position.owner != *lender_info.key {
        return Err(HubError::Unauthorized.into());
    }

    let now = Clock::get()?.unix_timestamp;
    HubLedger::withdraw(&config, &mut pool, &mut position, amount, now)?;

    position.serialize(&mut &mut position_info.data.borrow_mut()[..])?;
    pool.serialize(&mut &mut pool_info.data.borrow_mut()[..])?;

    msg!("Withdrew {} for {}", amount, lender_info.key);
    // In production, would transfer the settlement tokens back to the lender
    Ok(())
}

fn process_harvest_interest(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let lender_info = next_account_info(account_info_iter)?;
    let config_info = next_account_info(account_info_iter)?;
    let pool_info = next_account_info(account_info_iter)?;
    let position_info = next_account_info(account_info_iter)?;

    if !lender_info.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    let config: HubConfig = load_account(program_id, config_info, &HubConfig::DISCRIMINATOR)?;
    config.validate()?;

    let mut pool: HubPool = load_account(program_id, pool_info, &HubPool::DISCRIMINATOR)?;
    pool.validate()?;

    let (position_pubkey, _) = find_lender_position_address(program_id, lender_info.key);
    if position_pubkey != *position_info.key {
        return Err(HubError::InvalidPda.into());
    }
    if position_info.owner != program_id {
        return Err(HubError::NotInitialized.into());
    }

    let mut position: LenderPosition =
        load_account(program_id, position_info, &LenderPosition::DISCRIMINATOR)?;
    position.validate()?;

    if position.owner != *lender_info.key {
        return Err(HubError::Unauthorized.into());
    }

    let now = Clock::get()?.unix_timestamp;
    let payout = HubLedger::harvest_interest(&config, &mut pool, &mut position, now)?;

    position.serialize(&mut &mut position_info.data.borrow_mut()[..])?;
    pool.serialize(&mut &mut pool_info.data.borrow_mut()[..])?;

    msg!("Paying out {} interest to {}", payout, lender_info.key);
    // In production, would transfer the interest from the pool vault
    Ok(())
}

fn process_lock_collateral(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    items: Vec<CollateralItemRef>,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let borrower_info = next_account_info(account_info_iter)?;
    let config_info = next_account_info(account_info_iter)?;
    let position_info = next_account_info(account_info_iter)?;
    let system_program = next_account_info(account_info_iter)?;

    if !borrower_info.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    if items.is_empty() {
        return Err(HubError::InvalidAmount.into());
    }

    let config: HubConfig = load_account(program_id, config_info, &HubConfig::DISCRIMINATOR)?;
    config.validate()?;
    HubLedger::ensure_active(&config)?;

    let (position_pubkey, position_bump) =
        find_borrower_position_address(program_id, borrower_info.key);
    if position_pubkey != *position_info.key {
        return Err(HubError::InvalidPda.into());
    }

    let now = Clock::get()?.unix_timestamp;

    // Create the position on first lock (clients can't create PDAs directly).
    let mut position = if position_info.owner != program_id {
        create_pda_account(
            borrower_info,
            position_info,
            system_program,
            program_id,
            BorrowerPosition::LEN,
            &[
                BORROWER_POSITION_SEED,
                borrower_info.key.as_ref(),
                &[position_bump],
            ],
        )?;

        BorrowerPosition::new(*borrower_info.key, now, position_bump)
    } else {
        let position: BorrowerPosition =
            load_account(program_id, position_info, &BorrowerPosition::DISCRIMINATOR)?;
        position.validate()?;

        if position.owner != *borrower_info.key {
            return Err(HubError::Unauthorized.into());
        }
        position
    };

    for item in &items {
        let collection_info = next_account_info(account_info_iter)?;
        let lock_info = next_account_info(account_info_iter)?;

        let (collection_pubkey, _) = find_collection_address(program_id, &item.collection);
        if collection_pubkey != *collection_info.key {
            return Err(HubError::InvalidPda.into());
        }
        if collection_info.owner != program_id {
            return Err(HubError::CollectionNotSupported.into());
        }

        let collection: CollectionConfig =
            load_account(program_id, collection_info, &CollectionConfig::DISCRIMINATOR)?;
        collection.validate()?;

        let (lock_pubkey, lock_bump) =
            find_lock_record_address(program_id, &item.collection, item.item_id);
        if lock_pubkey != *lock_info.key {
            return Err(HubError::InvalidPda.into());
        }

        // Create the lock record the first time this item is ever locked.
        let mut lock = if lock_info.owner != program_id {
            let item_id_bytes = item.item_id.to_le_bytes();
            create_pda_account(
                borrower_info,
                lock_info,
                system_program,
                program_id,
                LockRecord::LEN,
                &[
                    LOCK_RECORD_SEED,
                    item.collection.as_ref(),
                    &item_id_bytes,
                    &[lock_bump],
                ],
            )?;

            LockRecord::new(item.collection, item.item_id, lock_bump)
        } else {
            let lock: LockRecord =
                load_account(program_id, lock_info, &LockRecord::DISCRIMINATOR)?;
            lock.validate()?;
            lock
        };

        HubLedger::lock_item(&config, &collection, &mut position, &mut lock, *item, now)?;
        lock.serialize(&mut &mut lock_info.data.borrow_mut()[..])?;

        msg!(
            "Locked item {} of collection {} at value {}",
            item.item_id,
            item.collection,
            collection.unit_price
        );
    }

    position.serialize(&mut &mut position_info.data.borrow_mut()[..])?;

    msg!(
        "Collateral value for {} now {}",
        borrower_info.key,
        position.total_collateral_value
    );
    // In production, would pull each item into program escrow
    Ok(())
}

fn process_unlock_collateral(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    items: Vec<CollateralItemRef>,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let borrower_info = next_account_info(account_info_iter)?;
    let config_info = next_account_info(account_info_iter)?;
    let pool_info = next_account_info(account_info_iter)?;
    let position_info = next_account_info(account_info_iter)?;

    if !borrower_info.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    if items.is_empty() {
        return Err(HubError::InvalidAmount.into());
    }

    let config: HubConfig = load_account(program_id, config_info, &HubConfig::DISCRIMINATOR)?;
    config.validate()?;
    HubLedger::ensure_active(&config)?;

    let mut pool: HubPool = load_account(program_id, pool_info, &HubPool::DISCRIMINATOR)?;
    pool.validate()?;

    let (position_pubkey, _) = find_borrower_position_address(program_id, borrower_info.key);
    if position_pubkey != *position_info.key {
        return Err(HubError::InvalidPda.into());
    }
    if position_info.owner != program_id {
        return Err(HubError::NotInitialized.into());
    }

    let mut position: BorrowerPosition =
        load_account(program_id, position_info, &BorrowerPosition::DISCRIMINATOR)?;
    position.validate()?;

    if position.owner != *borrower_info.key {
        return Err(HubError::Unauthorized.into());
    }

    let now = Clock::get()?.unix_timestamp;

    // Bring the debt current before testing whether the remaining
    // collateral still covers it.
    HubLedger::checkpoint_borrower(&config, &mut pool, &mut position, now)?;

    let mut value_removed: u64 = 0;
    for item in &items {
        let collection_info = next_account_info(account_info_iter)?;
        let lock_info = next_account_info(account_info_iter)?;

        let (collection_pubkey, _) = find_collection_address(program_id, &item.collection);
        if collection_pubkey != *collection_info.key {
            return Err(HubError::InvalidPda.into());
        }
        if collection_info.owner != program_id {
            return Err(HubError::CollectionNotSupported.into());
        }

        let collection: CollectionConfig =
            load_account(program_id, collection_info, &CollectionConfig::DISCRIMINATOR)?;
        collection.validate()?;

        let (lock_pubkey, _) =
            find_lock_record_address(program_id, &item.collection, item.item_id);
        if lock_pubkey != *lock_info.key {
            return Err(HubError::InvalidPda.into());
        }
        if lock_info.owner != program_id {
            return Err(HubError::ItemNotLockedByCaller.into());
        }

        let mut lock: LockRecord =
            load_account(program_id, lock_info, &LockRecord::DISCRIMINATOR)?;
        lock.validate()?;

        let unit = HubLedger::unlock_item(&config, &collection, &mut position, &mut lock, *item)?;
        value_removed = value_removed
            .checked_add(unit)
            .ok_or(HubError::ArithmeticOverflow)?;

        lock.serialize(&mut &mut lock_info.data.borrow_mut()[..])?;
        msg!("Unlocked item {} of collection {}", item.item_id, item.collection);
    }

    HubLedger::settle_unlock(&config, &mut position, value_removed)?;

    position.serialize(&mut &mut position_info.data.borrow_mut()[..])?;
    pool.serialize(&mut &mut pool_info.data.borrow_mut()[..])?;

    msg!(
        "Returned {} items to {}, remaining collateral value {}",
        items.len(),
        borrower_info.key,
        position.total_collateral_value
    );
    // In production, would release each item from program escrow
    Ok(())
}

fn process_borrow(program_id: &Pubkey, accounts: &[AccountInfo], amount: u64) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let borrower_info = next_account_info(account_info_iter)?;
    let config_info = next_account_info(account_info_iter)?;
    let pool_info = next_account_info(account_info_iter)?;
    let position_info = next_account_info(account_info_iter)?;

    if !borrower_info.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    let config: HubConfig = load_account(program_id, config_info, &HubConfig::DISCRIMINATOR)?;
    config.validate()?;

    let mut pool: HubPool = load_account(program_id, pool_info, &HubPool::DISCRIMINATOR)?;
    pool.validate()?;

    let (position_pubkey, _) = find_borrower_position_address(program_id, borrower_info.key);
    if position_pubkey != *position_info.key {
        return Err(HubError::InvalidPda.into());
    }
    if position_info.owner != program_id {
        return Err(HubError::NotInitialized.into());
    }

    let mut position: BorrowerPosition =
        load_account(program_id, position_info, &BorrowerPosition::DISCRIMINATOR)?;
    position.validate()?;

    if position.owner != *borrower_info.key {
        return Err(HubError::Unauthorized.into());
    }

    let now = Clock::get()?.unix_timestamp;
    HubLedger::borrow(&config, &mut pool, &mut position, amount, now)?;

    position.serialize(&mut &mut position_info.data.borrow_mut()[..])?;
    pool.serialize(&mut &mut pool_info.data.borrow_mut()[..])?;

    msg!(
        "Borrowed {} for {}, debt now {} against collateral value {}",
        amount,
        borrower_info.key,
        position.borrowed_amount,
        position.total_collateral_value
    );
    // In production, would transfer the settlement tokens from the pool vault
    Ok(())
}

fn process_repay(program_id: &Pubkey, accounts: &[AccountInfo], amount: u64) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let borrower_info = next_account_info(account_info_iter)?;
    let config_info = next_account_info(account_info_iter)?;
    let pool_info = next_account_info(account_info_iter)?;
    let position_info = next_account_info(account_info_iter)?;

    if !borrower_info.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    let config: HubConfig = load_account(program_id, config_info, &HubConfig::DISCRIMINATOR)?;
    config.validate()?;

    let mut pool: HubPool = load_account(program_id, pool_info, &HubPool::DISCRIMINATOR)?;
    pool.validate()?;

    let (position_pubkey, _) = find_borrower_position_address(program_id, borrower_info.key);
    if position_pubkey != *position_info.key {
        return Err(HubError::InvalidPda.into());
    }
    if position_info.owner != program_id {
        return Err(HubError::NotInitialized.into());
    }

    let mut position: BorrowerPosition =
        load_account(program_id, position_info, &BorrowerPosition::DISCRIMINATOR)?;
    position.validate()?;

    if position.owner != *borrower_info.key {
        return Err(HubError::Unauthorized.into());
    }

    let now = Clock::get()?.unix_timestamp;
    let effective = HubLedger::repay(&config, &mut pool, &mut position, amount, now)?;

    position.serialize(&mut &mut position_info.data.borrow_mut()[..])?;
    pool.serialize(&mut &mut pool_info.data.borrow_mut()[..])?;

    msg!(
        "Repaid {} of requested {} for {}, debt now {}",
        effective,
        amount,
        borrower_info.key,
        position.borrowed_amount
    );
    // In production, would pull the repayment into the pool vault
    Ok(())
}

fn process_handle_default(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let authority_info = next_account_info(account_info_iter)?;
    let config_info = next_account_info(account_info_iter)?;
    let pool_info = next_account_info(account_info_iter)?;
    let position_info = next_account_info(account_info_iter)?;
    let treasury_info = next_account_info(account_info_iter)?;

    if !authority_info.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    let config: HubConfig = load_account(program_id, config_info, &HubConfig::DISCRIMINATOR)?;
    config.validate()?;

    if config.authority != *authority_info.key {
        return Err(HubError::Unauthorized.into());
    }
    if config.treasury != *treasury_info.key {
        return Err(HubError::InvalidAccountData.into());
    }

    let mut pool: HubPool = load_account(program_id, pool_info, &HubPool::DISCRIMINATOR)?;
    pool.validate()?;

    if position_info.owner != program_id {
        return Err(HubError::NotInitialized.into());
    }

    let mut position: BorrowerPosition =
        load_account(program_id, position_info, &BorrowerPosition::DISCRIMINATOR)?;
    position.validate()?;

    let (position_pubkey, _) = find_borrower_position_address(program_id, &position.owner);
    if position_pubkey != *position_info.key {
        return Err(HubError::InvalidPda.into());
    }

    let now = Clock::get()?.unix_timestamp;

    // Snapshot the collateral set before resolution clears it.
    let seized: Vec<CollateralItemRef> = position.collateral_items.clone();
    let outcome = HubLedger::handle_default(&config, &mut pool, &mut position, now)?;

    for item in &seized {
        let lock_info = next_account_info(account_info_iter)?;

        let (lock_pubkey, _) =
            find_lock_record_address(program_id, &item.collection, item.item_id);
        if lock_pubkey != *lock_info.key {
            return Err(HubError::InvalidPda.into());
        }

        let mut lock: LockRecord =
            load_account(program_id, lock_info, &LockRecord::DISCRIMINATOR)?;
        lock.validate()?;
        lock.release(&position.owner)?;
        lock.serialize(&mut &mut lock_info.data.borrow_mut()[..])?;
    }

    position.serialize(&mut &mut position_info.data.borrow_mut()[..])?;
    pool.serialize(&mut &mut pool_info.data.borrow_mut()[..])?;

    msg!(
        "Defaulted position of {}: cleared {} debt, seized {} items valued {}",
        position.owner,
        outcome.debt_cleared,
        outcome.items_seized,
        outcome.collateral_value
    );
    msg!("Seized collateral assigned to treasury {}", treasury_info.key);
    // In production, would move each item from escrow to the treasury
    Ok(())
}

fn process_update_hub_parameters(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    lending_rate_bps: Option<u16>,
    borrowing_rate_bps: Option<u16>,
    borrowing_limit_bps: Option<u16>,
    default_threshold_bps: Option<u16>,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let authority_info = next_account_info(account_info_iter)?;
    let config_info = next_account_info(account_info_iter)?;

    if !authority_info.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    let mut config: HubConfig = load_account(program_id, config_info, &HubConfig::DISCRIMINATOR)?;
    config.validate()?;

    if config.authority != *authority_info.key {
        return Err(HubError::Unauthorized.into());
    }

    if let Some(value) = lending_rate_bps {
        config.lending_rate_bps = value;
    }
    if let Some(value) = borrowing_rate_bps {
        config.borrowing_rate_bps = value;
    }
    if let Some(value) = borrowing_limit_bps {
        config.borrowing_limit_bps = value;
    }
    if let Some(value) = default_threshold_bps {
        config.default_threshold_bps = value;
    }

    config.last_update = Clock::get()?.unix_timestamp;
    config.validate()?;
    config.serialize(&mut &mut config_info.data.borrow_mut()[..])?;

    msg!(
        "Hub parameters updated: lend {} bps, borrow {} bps, limit {} bps, threshold {} bps",
        config.lending_rate_bps,
        config.borrowing_rate_bps,
        config.borrowing_limit_bps,
        config.default_threshold_bps
    );
    Ok(())
}

fn process_set_paused(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    paused: bool,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let authority_info = next_account_info(account_info_iter)?;
    let config_info = next_account_info(account_info_iter)?;

    if !authority_info.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    let mut config: HubConfig = load_account(program_id, config_info, &HubConfig::DISCRIMINATOR)?;
    config.validate()?;

    if config.authority != *authority_info.key {
        return Err(HubError::Unauthorized.into());
    }

    config.paused = paused;
    config.last_update = Clock::get()?.unix_timestamp;
    config.serialize(&mut &mut config_info.data.borrow_mut()[..])?;

    if paused {
        msg!("Hub paused, user operations suspended");
    } else {
        msg!("Hub unpaused");
    }
    Ok(())
}

fn process_set_treasury(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let authority_info = next_account_info(account_info_iter)?;
    let config_info = next_account_info(account_info_iter)?;
    let new_treasury_info = next_account_info(account_info_iter)?;

    if !authority_info.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    let mut config: HubConfig = load_account(program_id, config_info, &HubConfig::DISCRIMINATOR)?;
    config.validate()?;

    if config.authority != *authority_info.key {
        return Err(HubError::Unauthorized.into());
    }

    config.treasury = *new_treasury_info.key;
    config.last_update = Clock::get()?.unix_timestamp;
    config.serialize(&mut &mut config_info.data.borrow_mut()[..])?;

    msg!("Treasury set to {}", new_treasury_info.key);
    Ok(())
}

fn process_register_collection(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    unit_price: u64,
    max_supply: u64,
    project_uri: String,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let authority_info = next_account_info(account_info_iter)?;
    let config_info = next_account_info(account_info_iter)?;
    let collection_info = next_account_info(account_info_iter)?;
    let collection_pda_info = next_account_info(account_info_iter)?;
    let system_program = next_account_info(account_info_iter)?;

    if !authority_info.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    let config: HubConfig = load_account(program_id, config_info, &HubConfig::DISCRIMINATOR)?;
    config.validate()?;

    if config.authority != *authority_info.key {
        return Err(HubError::Unauthorized.into());
    }

    let (collection_pubkey, collection_bump) =
        find_collection_address(program_id, collection_info.key);
    if collection_pubkey != *collection_pda_info.key {
        return Err(HubError::InvalidPda.into());
    }
    if collection_pda_info.owner == program_id {
        return Err(HubError::AlreadyInitialized.into());
    }

    create_pda_account(
        authority_info,
        collection_pda_info,
        system_program,
        program_id,
        CollectionConfig::LEN,
        &[
            COLLECTION_SEED,
            collection_info.key.as_ref(),
            &[collection_bump],
        ],
    )?;

    let now = Clock::get()?.unix_timestamp;
    let entry = CollectionConfig::new(
        *collection_info.key,
        unit_price,
        max_supply,
        project_uri,
        now,
        collection_bump,
    )?;
    entry.serialize(&mut &mut collection_pda_info.data.borrow_mut()[..])?;

    msg!(
        "Collection {} registered at unit price {}",
        collection_info.key,
        entry.unit_price
    );
    Ok(())
}

fn process_update_collection(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    unit_price: Option<u64>,
    enabled: Option<bool>,
    current_supply: Option<u64>,
    project_uri: Option<String>,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let authority_info = next_account_info(account_info_iter)?;
    let config_info = next_account_info(account_info_iter)?;
    let collection_pda_info = next_account_info(account_info_iter)?;

    if !authority_info.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }

    let config: HubConfig = load_account(program_id, config_info, &HubConfig::DISCRIMINATOR)?;
    config.validate()?;

    if config.authority != *authority_info.key {
        return Err(HubError::Unauthorized.into());
    }

    if collection_pda_info.owner != program_id {
        return Err(HubError::NotInitialized.into());
    }

    let mut entry: CollectionConfig =
        load_account(program_id, collection_pda_info, &CollectionConfig::DISCRIMINATOR)?;
    entry.validate()?;

    if let Some(value) = unit_price {
        // Zero de-supports the collection without forgetting it
        entry.unit_price = value;
    }
    if let Some(value) = enabled {
        entry.enabled = value;
    }
    if let Some(value) = current_supply {
        entry.current_supply = value;
    }
    if let Some(uri) = project_uri {
        if uri.len() > MAX_URI_LENGTH {
            return Err(HubError::UriTooLong.into());
        }
        entry.project_uri = uri;
    }

    entry.last_update = Clock::get()?.unix_timestamp;
    entry.validate()?;
    entry.serialize(&mut &mut collection_pda_info.data.borrow_mut()[..])?;

    msg!(
        "Collection {} updated: unit price {}, enabled {}",
        entry.collection,
        entry.unit_price,
        entry.enabled
    );
    Ok(())
}
