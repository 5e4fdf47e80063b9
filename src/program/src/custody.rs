//! Value movement primitives
//!
//! These helpers only execute movements that the processor has already
//! authorized. Each one checks the source balance before touching anything,
//! so a shortfall aborts with `InsufficientFunds` and no partial transfer.

use solana_program::{
    account_info::AccountInfo,
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed},
    program_error::ProgramError,
    program_pack::Pack,
    pubkey::Pubkey,
    rent::Rent,
    system_instruction,
};
use spl_token::state::Account as TokenAccount;

use crate::error::TimelockError;

/// Moves lamports out of a system-owned signer account
pub fn fund_native<'a>(
    from_info: &AccountInfo<'a>,
    to_info: &AccountInfo<'a>,
    system_program_info: &AccountInfo<'a>,
    amount: u64,
) -> ProgramResult {
    if from_info.lamports() < amount {
        msg!(
            "Cannot move {} lamports, source holds {}",
            amount,
            from_info.lamports()
        );
        return Err(TimelockError::InsufficientFunds.into());
    }

    invoke(
        &system_instruction::transfer(from_info.key, to_info.key, amount),
        &[
            from_info.clone(),
            to_info.clone(),
            system_program_info.clone(),
        ],
    )
}

/// Moves lamports out of a program-owned record without touching its rent reserve
pub fn release_native(
    from_info: &AccountInfo,
    to_info: &AccountInfo,
    amount: u64,
    rent: &Rent,
) -> ProgramResult {
    let reserve = rent.minimum_balance(from_info.data_len());
    let available = from_info.lamports().saturating_sub(reserve);
    if available < amount {
        msg!("Cannot release {} lamports, custody holds {}", amount, available);
        return Err(TimelockError::InsufficientFunds.into());
    }

    let from_lamports = from_info
        .lamports()
        .checked_sub(amount)
        .ok_or(TimelockError::ArithmeticOverflow)?;
    let to_lamports = to_info
        .lamports()
        .checked_add(amount)
        .ok_or(TimelockError::ArithmeticOverflow)?;

    **from_info.try_borrow_mut_lamports()? = from_lamports;
    **to_info.try_borrow_mut_lamports()? = to_lamports;

    Ok(())
}

/// Token balance of an SPL token account
pub fn token_balance(token_account_info: &AccountInfo) -> Result<u64, ProgramError> {
    Ok(TokenAccount::unpack(&token_account_info.try_borrow_data()?)?.amount)
}

/// Moves SPL tokens between two token accounts.
///
/// `signer_seeds` is empty when `authority_info` signed the transaction, and
/// holds the authority's derivation seeds when a program address signs.
pub fn move_token<'a>(
    token_program_info: &AccountInfo<'a>,
    from_info: &AccountInfo<'a>,
    to_info: &AccountInfo<'a>,
    authority_info: &AccountInfo<'a>,
    signer_seeds: &[&[&[u8]]],
    amount: u64,
) -> ProgramResult {
    let available = token_balance(from_info)?;
    if available < amount {
        msg!("Cannot move {} tokens, source holds {}", amount, available);
        return Err(TimelockError::InsufficientFunds.into());
    }

    let ix = spl_token::instruction::transfer(
        token_program_info.key,
        from_info.key,
        to_info.key,
        authority_info.key,
        &[] as &[&Pubkey],
        amount,
    )?;
    let account_infos = [
        from_info.clone(),
        to_info.clone(),
        authority_info.clone(),
        token_program_info.clone(),
    ];

    if signer_seeds.is_empty() {
        invoke(&ix, &account_infos)
    } else {
        invoke_signed(&ix, &account_infos, signer_seeds)
    }
}

/// Creates a rent-exempt account at a program address.
///
/// An address that was pre-funded by a plain transfer is topped up,
/// allocated and assigned instead, since `create_account` rejects it.
pub fn create_pda_account<'a>(
    payer_info: &AccountInfo<'a>,
    new_account_info: &AccountInfo<'a>,
    system_program_info: &AccountInfo<'a>,
    space: usize,
    owner: &Pubkey,
    signer_seeds: &[&[u8]],
    rent: &Rent,
) -> ProgramResult {
    let required_lamports = rent.minimum_balance(space);

    if new_account_info.lamports() == 0 {
        return invoke_signed(
            &system_instruction::create_account(
                payer_info.key,
                new_account_info.key,
                required_lamports,
                space as u64,
                owner,
            ),
            &[
                payer_info.clone(),
                new_account_info.clone(),
                system_program_info.clone(),
            ],
            &[signer_seeds],
        );
    }

    let top_up = required_lamports.saturating_sub(new_account_info.lamports());
    if top_up > 0 {
        fund_native(payer_info, new_account_info, system_program_info, top_up)?;
    }
    invoke_signed(
        &system_instruction::allocate(new_account_info.key, space as u64),
        &[new_account_info.clone(), system_program_info.clone()],
        &[signer_seeds],
    )?;
    invoke_signed(
        &system_instruction::assign(new_account_info.key, owner),
        &[new_account_info.clone(), system_program_info.clone()],
        &[signer_seeds],
    )
}

/// Creates the custody token account at its derived address, with the lock as authority
#[allow(clippy::too_many_arguments)]
pub fn open_token_custody<'a>(
    payer_info: &AccountInfo<'a>,
    custody_info: &AccountInfo<'a>,
    mint_info: &AccountInfo<'a>,
    lock_address: &Pubkey,
    token_program_info: &AccountInfo<'a>,
    system_program_info: &AccountInfo<'a>,
    custody_signer_seeds: &[&[u8]],
    rent: &Rent,
) -> ProgramResult {
    create_pda_account(
        payer_info,
        custody_info,
        system_program_info,
        TokenAccount::LEN,
        token_program_info.key,
        custody_signer_seeds,
        rent,
    )?;

    invoke(
        &spl_token::instruction::initialize_account3(
            token_program_info.key,
            custody_info.key,
            mint_info.key,
            lock_address,
        )?,
        &[
            custody_info.clone(),
            mint_info.clone(),
            token_program_info.clone(),
        ],
    )
}
