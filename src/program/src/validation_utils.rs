use solana_program::{
    account_info::AccountInfo, clock::UnixTimestamp, entrypoint::ProgramResult, msg,
    program_error::ProgramError, program_pack::Pack, pubkey::Pubkey, system_program,
};
use spl_token::state::Account as TokenAccount;

use crate::{
    error::TimelockError,
    pack_utils::WithData,
    state::{AssetKind, TimelockAccount},
};

pub fn assert_is_signer(account: &AccountInfo) -> ProgramResult {
    if account.is_signer {
        Ok(())
    } else {
        Err(ProgramError::MissingRequiredSignature)
    }
}

pub fn assert_keys_equal(key1: &Pubkey, key2: &Pubkey, err: TimelockError) -> ProgramResult {
    if key1 != key2 {
        Err(err.into())
    } else {
        Ok(())
    }
}

pub fn assert_keys_unequal(key1: &Pubkey, key2: &Pubkey, err: TimelockError) -> ProgramResult {
    if key1 == key2 {
        Err(err.into())
    } else {
        Ok(())
    }
}

pub fn assert_system_program(account: &AccountInfo) -> ProgramResult {
    if *account.key != system_program::id() {
        Err(ProgramError::IncorrectProgramId)
    } else {
        Ok(())
    }
}

pub fn assert_token_program(account: &AccountInfo) -> ProgramResult {
    if *account.key != spl_token::id() {
        Err(TimelockError::InvalidTokenProgram.into())
    } else {
        Ok(())
    }
}

/// Amount is non-zero and at least `minimum`
pub fn assert_valid_amount(amount: u64, minimum: u64) -> ProgramResult {
    if amount == 0 {
        Err(TimelockError::InvalidAmount.into())
    } else if amount < minimum {
        Err(TimelockError::MinimumAmount.into())
    } else {
        Ok(())
    }
}

pub fn assert_valid_unlock_time(unlock_timestamp: UnixTimestamp, now: UnixTimestamp) -> ProgramResult {
    if unlock_timestamp <= now {
        msg!("Unlock: {}, Now: {}", unlock_timestamp, now);
        Err(TimelockError::InvalidUnlockTime.into())
    } else {
        Ok(())
    }
}

/// Nothing has been written to the address yet
pub fn assert_vacant(account: &AccountInfo) -> ProgramResult {
    if *account.owner != system_program::id() || !account.data_is_empty() {
        Err(TimelockError::AddressInUse.into())
    } else {
        Ok(())
    }
}

/// Loads the lock record, treating anything not written by this program as absent
pub fn assert_lock_exists(
    account: &AccountInfo,
    program_id: &Pubkey,
) -> Result<TimelockAccount, ProgramError> {
    if account.owner != program_id || account.data_len() != TimelockAccount::LEN {
        return Err(TimelockError::NotFound.into());
    }
    account.with_immut_data(Ok)
}

/// The account key is the address the record's seeds derive to
pub fn assert_lock_address(
    account: &AccountInfo,
    lock: &TimelockAccount,
    program_id: &Pubkey,
) -> ProgramResult {
    let expected = lock.lock_seeds().create_with_bump(program_id, lock.bump)?;
    assert_keys_equal(&expected, account.key, TimelockError::InvalidLockAddress)
}

pub fn assert_native(lock: &TimelockAccount) -> ProgramResult {
    match lock.asset_kind() {
        AssetKind::Native => Ok(()),
        AssetKind::Token(_) => Err(TimelockError::UseTokenWithdraw.into()),
    }
}

pub fn assert_token(lock: &TimelockAccount) -> Result<Pubkey, ProgramError> {
    match lock.asset_kind() {
        AssetKind::Token(mint) => Ok(mint),
        AssetKind::Native => Err(TimelockError::NotTokenAccount.into()),
    }
}

/// Withdrawal gate: requested by the recipient, matured, not yet withdrawn.
///
/// Anyone but the recipient is turned away before timing is considered.
pub fn assert_can_withdraw(
    lock: &TimelockAccount,
    requester: &Pubkey,
    now: UnixTimestamp,
) -> ProgramResult {
    if lock.recipient != *requester {
        Err(TimelockError::UnauthorizedRecipient.into())
    } else if !lock.is_unlocked(now) {
        msg!("Deadline: {}, Now: {}", lock.unlock_timestamp, now);
        Err(TimelockError::StillLocked.into())
    } else if lock.is_withdrawn {
        Err(TimelockError::AlreadyWithdrawn.into())
    } else {
        Ok(())
    }
}

/// Loads an SPL token account of `mint`, optionally requiring its authority
pub fn assert_token_account(
    account: &AccountInfo,
    mint: &Pubkey,
    authority: Option<&Pubkey>,
) -> Result<TokenAccount, ProgramError> {
    if *account.owner != spl_token::id() {
        return Err(TimelockError::InvalidTokenAccount.into());
    }
    let token_account = TokenAccount::unpack(&account.try_borrow_data()?)
        .map_err(|_| TimelockError::InvalidTokenAccount)?;
    if token_account.mint != *mint {
        return Err(TimelockError::InvalidTokenAccount.into());
    }
    if let Some(authority) = authority {
        if token_account.owner != *authority {
            return Err(TimelockError::InvalidTokenAccount.into());
        }
    }
    Ok(token_account)
}
