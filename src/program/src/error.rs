//! Error types

use thiserror::Error;

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use solana_program::{
    decode_error::DecodeError,
    msg,
    program_error::{PrintProgramError, ProgramError},
};

/// Errors returned by the timelock program.
///
/// Codes start at 6000 so that existing clients keep resolving
/// `InvalidUnlockTime..=InvalidTokenAccount` to the same numbers.
#[derive(Clone, Copy, Debug, Eq, Error, FromPrimitive, PartialEq)]
#[repr(u32)]
pub enum TimelockError {
    /// Unlock timestamp is not in the future
    #[error("InvalidUnlockTime")]
    InvalidUnlockTime = 6000,
    /// Amount is zero
    #[error("InvalidAmount")]
    InvalidAmount,
    /// Amount is below the protocol minimum
    #[error("MinimumAmount")]
    MinimumAmount,
    /// Unlock timestamp not reached yet
    #[error("StillLocked")]
    StillLocked,
    /// The lock was already paid out
    #[error("AlreadyWithdrawn")]
    AlreadyWithdrawn,
    /// Requester is not the designated recipient
    #[error("UnauthorizedRecipient")]
    UnauthorizedRecipient,
    /// Token lock passed to the native withdrawal
    #[error("UseTokenWithdraw")]
    UseTokenWithdraw,
    /// Native lock passed to the token withdrawal
    #[error("NotTokenAccount")]
    NotTokenAccount,
    /// Token account has the wrong mint, owner or address
    #[error("InvalidTokenAccount")]
    InvalidTokenAccount,
    /// Lock address already holds a record
    #[error("AddressInUse")]
    AddressInUse,
    /// No lock record at the address
    #[error("NotFound")]
    NotFound,
    /// Source balance cannot cover the movement
    #[error("InsufficientFunds")]
    InsufficientFunds,
    /// Account key does not match the derived lock address
    #[error("InvalidLockAddress")]
    InvalidLockAddress,
    /// Token program account is not SPL Token
    #[error("InvalidTokenProgram")]
    InvalidTokenProgram,
    /// Lock record bytes could not be decoded
    #[error("UnpackError")]
    UnpackError,
    /// Lamport arithmetic overflowed
    #[error("ArithmeticOverflow")]
    ArithmeticOverflow,
}

impl From<TimelockError> for ProgramError {
    fn from(e: TimelockError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for TimelockError {
    fn type_of() -> &'static str {
        "Timelock Error"
    }
}

impl PrintProgramError for TimelockError {
    fn print<E>(&self)
    where
        E: 'static + std::error::Error + DecodeError<E> + PrintProgramError + FromPrimitive,
    {
        match self {
            TimelockError::InvalidUnlockTime => msg!("Error: Unlock time must be in the future."),
            TimelockError::InvalidAmount => msg!("Error: Amount must be greater than 0."),
            TimelockError::MinimumAmount => msg!("Error: Amount is below the minimum lock size."),
            TimelockError::StillLocked => msg!("Error: Funds are still locked."),
            TimelockError::AlreadyWithdrawn => msg!("Error: Funds have already been withdrawn."),
            TimelockError::UnauthorizedRecipient => {
                msg!("Error: Only the designated recipient can withdraw.")
            }
            TimelockError::UseTokenWithdraw => {
                msg!("Error: This is a token lock, use the WithdrawToken instruction.")
            }
            TimelockError::NotTokenAccount => msg!("Error: This is not a token lock."),
            TimelockError::InvalidTokenAccount => msg!("Error: Invalid token account."),
            TimelockError::AddressInUse => msg!("Error: A lock already exists at this address."),
            TimelockError::NotFound => msg!("Error: No lock exists at this address."),
            TimelockError::InsufficientFunds => {
                msg!("Error: Source balance is too small for the transfer.")
            }
            TimelockError::InvalidLockAddress => {
                msg!("Error: Account key does not match the derived lock address.")
            }
            TimelockError::InvalidTokenProgram => msg!("Error: Token program is not SPL Token."),
            TimelockError::UnpackError => {
                msg!("Error: There was an issue deserializing Account data.")
            }
            TimelockError::ArithmeticOverflow => msg!("Error: Arithmetic overflow."),
        }
    }
}
