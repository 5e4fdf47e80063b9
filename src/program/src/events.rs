//! Audit events written to the program log
//!
//! Each event is a single `sol_log_data` entry: an 8-byte discriminator
//! followed by the Borsh-encoded body. Events are for indexers only; no
//! instruction reads them back.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    clock::UnixTimestamp, entrypoint::ProgramResult, log::sol_log_data,
    program_error::ProgramError, pubkey::Pubkey,
};

use crate::constants::{FUNDS_WITHDRAWN_DISCRIMINATOR, LOCK_CREATED_DISCRIMINATOR};

/// A lock was created
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct LockCreated {
    /// Lock address
    pub address: Pubkey,
    /// Depositor
    pub creator: Pubkey,
    /// Designated recipient
    pub recipient: Pubkey,
    /// Locked amount
    pub amount: u64,
    /// Maturity timestamp
    pub unlock_timestamp: UnixTimestamp,
    /// Mint of a token lock
    pub mint: Option<Pubkey>,
}

/// A lock was paid out
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct FundsWithdrawn {
    /// Lock address
    pub address: Pubkey,
    /// Recipient that withdrew
    pub recipient: Pubkey,
    /// Amount paid out
    pub amount: u64,
}

/// An event with a fixed log discriminator
pub trait Event: BorshSerialize {
    /// Leading bytes identifying the event type
    const DISCRIMINATOR: [u8; 8];

    /// Discriminator followed by the Borsh body
    fn data(&self) -> Result<Vec<u8>, ProgramError> {
        let mut data = Self::DISCRIMINATOR.to_vec();
        self.serialize(&mut data)
            .map_err(|e| ProgramError::BorshIoError(e.to_string()))?;
        Ok(data)
    }

    /// Writes the event to the program log
    fn emit(&self) -> ProgramResult {
        sol_log_data(&[&self.data()?]);
        Ok(())
    }
}

impl Event for LockCreated {
    const DISCRIMINATOR: [u8; 8] = LOCK_CREATED_DISCRIMINATOR;
}

impl Event for FundsWithdrawn {
    const DISCRIMINATOR: [u8; 8] = FUNDS_WITHDRAWN_DISCRIMINATOR;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_data_is_prefixed() {
        let event = FundsWithdrawn {
            address: Pubkey::new_unique(),
            recipient: Pubkey::new_unique(),
            amount: 3_000_000,
        };

        let data = event.data().unwrap();
        assert_eq!(data[..8], FUNDS_WITHDRAWN_DISCRIMINATOR);
        assert_eq!(data.len(), 8 + 32 + 32 + 8);
        assert_eq!(FundsWithdrawn::try_from_slice(&data[8..]).unwrap(), event);
    }

    #[test]
    fn native_lock_event_has_no_mint() {
        let event = LockCreated {
            address: Pubkey::new_unique(),
            creator: Pubkey::new_unique(),
            recipient: Pubkey::new_unique(),
            amount: 1_000_000,
            unlock_timestamp: 1_700_000_000,
            mint: None,
        };

        let data = event.data().unwrap();
        assert_eq!(data[..8], LOCK_CREATED_DISCRIMINATOR);
        assert_eq!(*data.last().unwrap(), 0);
    }
}
