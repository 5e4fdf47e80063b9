//! Lock and custody address derivation
//!
//! Every party (this program, clients, tests) derives addresses through these
//! functions so the seed encoding never diverges: a fixed tag, 32-byte keys,
//! and little-endian fixed-width integers.

use solana_program::{program_error::ProgramError, pubkey::Pubkey};

use crate::{
    constants::{CUSTODY_SEED_TAG, LOCK_SEED_TAG},
    error::TimelockError,
};

/// Owned copy of the seeds of a lock address, minus the bump.
///
/// Needed to sign for the lock address during CPIs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockSeeds {
    creator: [u8; 32],
    unlock_timestamp: [u8; 8],
    seed: [u8; 8],
    mint: Option<[u8; 32]>,
}

impl LockSeeds {
    /// Seeds of a native lock
    pub fn native(creator: &Pubkey, unlock_timestamp: i64, seed: u64) -> Self {
        Self {
            creator: creator.to_bytes(),
            unlock_timestamp: unlock_timestamp.to_le_bytes(),
            seed: seed.to_le_bytes(),
            mint: None,
        }
    }

    /// Seeds of a token lock
    pub fn token(creator: &Pubkey, unlock_timestamp: i64, seed: u64, mint: &Pubkey) -> Self {
        Self {
            mint: Some(mint.to_bytes()),
            ..Self::native(creator, unlock_timestamp, seed)
        }
    }

    /// Seed slices in derivation order
    pub fn as_slices(&self) -> Vec<&[u8]> {
        let mut seeds: Vec<&[u8]> = vec![
            LOCK_SEED_TAG,
            &self.creator[..],
            &self.unlock_timestamp[..],
            &self.seed[..],
        ];
        if let Some(mint) = &self.mint {
            seeds.push(&mint[..]);
        }
        seeds
    }

    /// Seed slices followed by the bump, as expected by `invoke_signed`
    pub fn with_bump<'a>(&'a self, bump: &'a [u8; 1]) -> Vec<&'a [u8]> {
        let mut seeds = self.as_slices();
        seeds.push(&bump[..]);
        seeds
    }

    /// Searches for the canonical bump. `None` only if the whole bump range is exhausted.
    pub fn try_find(&self, program_id: &Pubkey) -> Option<(Pubkey, u8)> {
        Pubkey::try_find_program_address(&self.as_slices(), program_id)
    }

    /// Recomputes the address from a stored bump
    pub fn create_with_bump(&self, program_id: &Pubkey, bump: u8) -> Result<Pubkey, ProgramError> {
        let bump = [bump];
        Pubkey::create_program_address(&self.with_bump(&bump), program_id)
            .map_err(|_| TimelockError::InvalidLockAddress.into())
    }
}

/// Address of a native lock
pub fn derive_lock_address(
    program_id: &Pubkey,
    creator: &Pubkey,
    unlock_timestamp: i64,
    seed: u64,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &LockSeeds::native(creator, unlock_timestamp, seed).as_slices(),
        program_id,
    )
}

/// Address of a token lock. The mint is part of the key, so native and token
/// locks with the same creator, timestamp and seed never collide.
pub fn derive_token_lock_address(
    program_id: &Pubkey,
    creator: &Pubkey,
    unlock_timestamp: i64,
    seed: u64,
    mint: &Pubkey,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &LockSeeds::token(creator, unlock_timestamp, seed, mint).as_slices(),
        program_id,
    )
}

/// Address of the token account holding a token lock's custody
pub fn derive_token_custody_address(program_id: &Pubkey, lock_address: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[CUSTODY_SEED_TAG, lock_address.as_ref()], program_id)
}

/// Fallible variant of [`derive_token_custody_address`] used on chain
pub fn try_derive_token_custody_address(
    program_id: &Pubkey,
    lock_address: &Pubkey,
) -> Result<(Pubkey, u8), ProgramError> {
    Pubkey::try_find_program_address(&[CUSTODY_SEED_TAG, lock_address.as_ref()], program_id)
        .ok_or_else(|| TimelockError::InvalidLockAddress.into())
}
