//! Program instruction processor
use crate::{
    constants::{CUSTODY_SEED_TAG, MINIMUM_NATIVE_AMOUNT, MINIMUM_TOKEN_AMOUNT},
    custody,
    error::TimelockError,
    events::{Event, FundsWithdrawn, LockCreated},
    instruction::{InitializeLock, InitializeTokenLock, TimelockInstruction},
    pack_utils::WithData,
    pda::{try_derive_token_custody_address, LockSeeds},
    state::{TimelockAccount, TimelockInfo, TIMELOCK_ACCOUNT_SIZE},
    validation_utils::*,
};
use borsh::BorshDeserialize;
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program::set_return_data,
    program_error::ProgramError,
    program_pack::Pack,
    pubkey::Pubkey,
    sysvar::{clock::Clock, rent::Rent, Sysvar},
};
use spl_token::state::Account as TokenAccount;

/// Instruction processor
pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    let instruction = TimelockInstruction::try_from_slice(instruction_data)
        .map_err(|_| ProgramError::InvalidInstructionData)?;

    match instruction {
        TimelockInstruction::InitializeLock(ctx) => initialize_lock(program_id, accounts, ctx)?,
        TimelockInstruction::InitializeTokenLock(ctx) => {
            initialize_token_lock(program_id, accounts, ctx)?
        }
        TimelockInstruction::Withdraw => withdraw(program_id, accounts)?,
        TimelockInstruction::WithdrawToken => withdraw_token(program_id, accounts)?,
        TimelockInstruction::GetTimelockInfo => get_timelock_info(program_id, accounts)?,
    }

    Ok(())
}

/// Locks SOL in a new lock account
pub fn initialize_lock(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    ctx: InitializeLock,
) -> ProgramResult {
    msg!("Timelock::InitializeLock");

    let InitializeLock {
        amount,
        unlock_timestamp,
        seed,
        recipient,
    } = ctx;

    let account_info_iter = &mut accounts.iter();
    let creator_info = next_account_info(account_info_iter)?;
    let timelock_account_info = next_account_info(account_info_iter)?;
    let system_account_info = next_account_info(account_info_iter)?;

    assert_is_signer(creator_info)?;
    assert_system_program(system_account_info)?;
    assert_valid_amount(amount, MINIMUM_NATIVE_AMOUNT)?;

    let now = Clock::get()?.unix_timestamp;
    assert_valid_unlock_time(unlock_timestamp, now)?;

    let lock_seeds = LockSeeds::native(creator_info.key, unlock_timestamp, seed);
    let (timelock_account_key, bump) = lock_seeds
        .try_find(program_id)
        .ok_or(TimelockError::InvalidLockAddress)?;

    assert_keys_equal(
        &timelock_account_key,
        timelock_account_info.key,
        TimelockError::InvalidLockAddress,
    )?;
    assert_vacant(timelock_account_info)?;

    let rent = Rent::get()?;
    let reserve = rent
        .minimum_balance(TIMELOCK_ACCOUNT_SIZE)
        .saturating_sub(timelock_account_info.lamports());
    let required = reserve
        .checked_add(amount)
        .ok_or(TimelockError::ArithmeticOverflow)?;
    if creator_info.lamports() < required {
        msg!(
            "Creator holds {} lamports, {} required",
            creator_info.lamports(),
            required
        );
        return Err(TimelockError::InsufficientFunds.into());
    }

    let bump_seed = [bump];
    custody::create_pda_account(
        creator_info,
        timelock_account_info,
        system_account_info,
        TIMELOCK_ACCOUNT_SIZE,
        program_id,
        &lock_seeds.with_bump(&bump_seed),
        &rent,
    )?;
    custody::fund_native(creator_info, timelock_account_info, system_account_info, amount)?;

    let timelock_account_data = TimelockAccount {
        creator: *creator_info.key,
        recipient: recipient.unwrap_or(*creator_info.key),
        amount,
        unlock_timestamp,
        created_at: now,
        is_withdrawn: false,
        bump,
        token_mint: None,
        seed,
    };
    timelock_account_data.pack_into_slice(&mut timelock_account_info.try_borrow_mut_data()?);

    LockCreated {
        address: timelock_account_key,
        creator: timelock_account_data.creator,
        recipient: timelock_account_data.recipient,
        amount,
        unlock_timestamp,
        mint: None,
    }
    .emit()?;

    msg!(
        "Locked {} lamports in {} until {}",
        amount,
        timelock_account_key,
        unlock_timestamp
    );

    Ok(())
}

/// Locks SPL tokens in a new lock account and its custody token account
pub fn initialize_token_lock(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    ctx: InitializeTokenLock,
) -> ProgramResult {
    msg!("Timelock::InitializeTokenLock");

    let InitializeTokenLock {
        amount,
        unlock_timestamp,
        seed,
        recipient,
    } = ctx;

    let account_info_iter = &mut accounts.iter();
    let creator_info = next_account_info(account_info_iter)?;
    let timelock_account_info = next_account_info(account_info_iter)?;
    let mint_info = next_account_info(account_info_iter)?;
    let creator_token_account_info = next_account_info(account_info_iter)?;
    let custody_account_info = next_account_info(account_info_iter)?;
    let token_program_info = next_account_info(account_info_iter)?;
    let system_account_info = next_account_info(account_info_iter)?;

    assert_is_signer(creator_info)?;
    assert_token_program(token_program_info)?;
    assert_system_program(system_account_info)?;
    assert_valid_amount(amount, MINIMUM_TOKEN_AMOUNT)?;

    let now = Clock::get()?.unix_timestamp;
    assert_valid_unlock_time(unlock_timestamp, now)?;

    let lock_seeds = LockSeeds::token(creator_info.key, unlock_timestamp, seed, mint_info.key);
    let (timelock_account_key, bump) = lock_seeds
        .try_find(program_id)
        .ok_or(TimelockError::InvalidLockAddress)?;

    assert_keys_equal(
        &timelock_account_key,
        timelock_account_info.key,
        TimelockError::InvalidLockAddress,
    )?;
    assert_vacant(timelock_account_info)?;

    let (custody_account_key, custody_bump) =
        try_derive_token_custody_address(program_id, &timelock_account_key)?;
    assert_keys_equal(
        &custody_account_key,
        custody_account_info.key,
        TimelockError::InvalidTokenAccount,
    )?;
    assert_vacant(custody_account_info)?;

    if *mint_info.owner != spl_token::id() {
        return Err(TimelockError::InvalidTokenAccount.into());
    }
    let creator_token_account =
        assert_token_account(creator_token_account_info, mint_info.key, Some(creator_info.key))?;
    if creator_token_account.amount < amount {
        msg!(
            "Creator holds {} tokens, {} required",
            creator_token_account.amount,
            amount
        );
        return Err(TimelockError::InsufficientFunds.into());
    }

    let rent = Rent::get()?;
    let required = rent
        .minimum_balance(TIMELOCK_ACCOUNT_SIZE)
        .checked_add(rent.minimum_balance(TokenAccount::LEN))
        .ok_or(TimelockError::ArithmeticOverflow)?;
    if creator_info.lamports() < required {
        return Err(TimelockError::InsufficientFunds.into());
    }

    let bump_seed = [bump];
    custody::create_pda_account(
        creator_info,
        timelock_account_info,
        system_account_info,
        TIMELOCK_ACCOUNT_SIZE,
        program_id,
        &lock_seeds.with_bump(&bump_seed),
        &rent,
    )?;

    custody::open_token_custody(
        creator_info,
        custody_account_info,
        mint_info,
        &timelock_account_key,
        token_program_info,
        system_account_info,
        &[
            CUSTODY_SEED_TAG,
            timelock_account_key.as_ref(),
            &[custody_bump],
        ],
        &rent,
    )?;

    custody::move_token(
        token_program_info,
        creator_token_account_info,
        custody_account_info,
        creator_info,
        &[],
        amount,
    )?;

    let timelock_account_data = TimelockAccount {
        creator: *creator_info.key,
        recipient: recipient.unwrap_or(*creator_info.key),
        amount,
        unlock_timestamp,
        created_at: now,
        is_withdrawn: false,
        bump,
        token_mint: Some(*mint_info.key),
        seed,
    };
    timelock_account_data.pack_into_slice(&mut timelock_account_info.try_borrow_mut_data()?);

    LockCreated {
        address: timelock_account_key,
        creator: timelock_account_data.creator,
        recipient: timelock_account_data.recipient,
        amount,
        unlock_timestamp,
        mint: Some(*mint_info.key),
    }
    .emit()?;

    msg!(
        "Locked {} tokens of {} in {} until {}",
        amount,
        mint_info.key,
        timelock_account_key,
        unlock_timestamp
    );

    Ok(())
}

/// Pays out a matured native lock to its recipient
pub fn withdraw(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
    msg!("Timelock::Withdraw");

    let account_info_iter = &mut accounts.iter();
    let recipient_info = next_account_info(account_info_iter)?;
    let timelock_account_info = next_account_info(account_info_iter)?;

    assert_is_signer(recipient_info)?;
    let timelock_account = assert_lock_exists(timelock_account_info, program_id)?;
    assert_lock_address(timelock_account_info, &timelock_account, program_id)?;
    assert_native(&timelock_account)?;

    let now = Clock::get()?.unix_timestamp;
    assert_can_withdraw(&timelock_account, recipient_info.key, now)?;

    let rent = Rent::get()?;

    timelock_account_info.with_mut_data(|mut timelock_account_data| {
        let amount = timelock_account_data.amount;
        timelock_account_data.is_withdrawn = true;

        custody::release_native(timelock_account_info, recipient_info, amount, &rent)?;

        Ok(timelock_account_data)
    })?;

    FundsWithdrawn {
        address: *timelock_account_info.key,
        recipient: *recipient_info.key,
        amount: timelock_account.amount,
    }
    .emit()?;

    msg!(
        "Withdrew {} lamports from {}",
        timelock_account.amount,
        timelock_account_info.key
    );

    Ok(())
}

/// Pays out a matured token lock to a token account of the recipient's choice
pub fn withdraw_token(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
    msg!("Timelock::WithdrawToken");

    let account_info_iter = &mut accounts.iter();
    let recipient_info = next_account_info(account_info_iter)?;
    let timelock_account_info = next_account_info(account_info_iter)?;
    let custody_account_info = next_account_info(account_info_iter)?;
    let recipient_token_account_info = next_account_info(account_info_iter)?;
    let token_program_info = next_account_info(account_info_iter)?;

    assert_is_signer(recipient_info)?;
    assert_token_program(token_program_info)?;
    let timelock_account = assert_lock_exists(timelock_account_info, program_id)?;
    assert_lock_address(timelock_account_info, &timelock_account, program_id)?;
    let mint = assert_token(&timelock_account)?;

    let (custody_account_key, _) =
        try_derive_token_custody_address(program_id, timelock_account_info.key)?;
    assert_keys_equal(
        &custody_account_key,
        custody_account_info.key,
        TimelockError::InvalidTokenAccount,
    )?;
    assert_token_account(custody_account_info, &mint, Some(timelock_account_info.key))?;
    assert_keys_unequal(
        recipient_token_account_info.key,
        custody_account_info.key,
        TimelockError::InvalidTokenAccount,
    )?;
    assert_token_account(recipient_token_account_info, &mint, None)?;

    let now = Clock::get()?.unix_timestamp;
    assert_can_withdraw(&timelock_account, recipient_info.key, now)?;

    timelock_account_info.with_mut_data(|mut timelock_account_data| {
        timelock_account_data.is_withdrawn = true;
        Ok(timelock_account_data)
    })?;

    let lock_seeds = timelock_account.lock_seeds();
    let bump_seed = [timelock_account.bump];
    let signer_seeds = lock_seeds.with_bump(&bump_seed);
    custody::move_token(
        token_program_info,
        custody_account_info,
        recipient_token_account_info,
        timelock_account_info,
        &[signer_seeds.as_slice()],
        timelock_account.amount,
    )?;

    FundsWithdrawn {
        address: *timelock_account_info.key,
        recipient: *recipient_info.key,
        amount: timelock_account.amount,
    }
    .emit()?;

    msg!(
        "Withdrew {} tokens of {} from {}",
        timelock_account.amount,
        mint,
        timelock_account_info.key
    );

    Ok(())
}

/// Sets the `TimelockInfo` projection of a lock as return data
pub fn get_timelock_info(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
    msg!("Timelock::GetTimelockInfo");

    let account_info_iter = &mut accounts.iter();
    let timelock_account_info = next_account_info(account_info_iter)?;

    let timelock_account = assert_lock_exists(timelock_account_info, program_id)?;
    assert_lock_address(timelock_account_info, &timelock_account, program_id)?;

    let now = Clock::get()?.unix_timestamp;
    let info = TimelockInfo::project(&timelock_account, now);

    msg!(
        "Lock {}: amount {}, unlocks {}, withdrawn {}, remaining {}s",
        timelock_account_info.key,
        info.amount,
        info.unlock_timestamp,
        info.is_withdrawn,
        info.time_remaining
    );

    let data = borsh::to_vec(&info).map_err(|e| ProgramError::BorshIoError(e.to_string()))?;
    set_return_data(&data);

    Ok(())
}
