//! Program state
#![deny(missing_docs)]

use arrayref::{array_mut_ref, array_ref, array_refs, mut_array_refs};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    clock::UnixTimestamp,
    program_error::ProgramError,
    program_memory::sol_memcpy,
    program_pack::{IsInitialized, Pack, Sealed},
    pubkey::Pubkey,
};

use crate::{
    constants::LOCK_ACCOUNT_DISCRIMINATOR,
    error::TimelockError,
    pda::LockSeeds,
};

/// A time-locked escrow record, stored at its derived lock address
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TimelockAccount {
    // 32
    /// The depositor
    pub creator: Pubkey,
    // 32
    /// The only identity allowed to withdraw
    pub recipient: Pubkey,
    // 8
    /// Lamports or token base units held in custody
    pub amount: u64,
    // 8
    /// The time the funds stay locked until
    pub unlock_timestamp: UnixTimestamp,
    // 8
    /// Cluster time at creation
    pub created_at: UnixTimestamp,
    // 1
    /// Set once, on the single withdrawal
    pub is_withdrawn: bool,
    // 1
    /// Bump of the lock address
    pub bump: u8,
    // 1 + 32
    /// Mint of a token lock, `None` for native locks
    pub token_mint: Option<Pubkey>,
    // 8
    /// Caller-chosen derivation seed
    pub seed: u64,
}

/// What a lock holds
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetKind {
    /// Lamports kept in the record's own balance
    Native,
    /// SPL tokens of the given mint kept in the custody token account
    Token(Pubkey),
}

/// Lifecycle state of a lock address
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockState {
    /// Funds are in custody
    Active,
    /// Funds were paid out; terminal
    Withdrawn,
}

/// The size of a lock record
pub const TIMELOCK_ACCOUNT_SIZE: usize = DISCRIMINATOR_LEN
    + CREATOR_LEN
    + RECIPIENT_LEN
    + AMOUNT_LEN
    + UNLOCK_TIMESTAMP_LEN
    + CREATED_AT_LEN
    + IS_WITHDRAWN_LEN
    + BUMP_LEN
    + TOKEN_MINT_LEN
    + SEED_LEN;

const DISCRIMINATOR_LEN: usize = 8;
const CREATOR_LEN: usize = 32;
const RECIPIENT_LEN: usize = 32;
const AMOUNT_LEN: usize = 8;
const UNLOCK_TIMESTAMP_LEN: usize = 8;
const CREATED_AT_LEN: usize = 8;
const IS_WITHDRAWN_LEN: usize = 1;
const BUMP_LEN: usize = 1;
const TOKEN_MINT_LEN: usize = 1 + 32;
const SEED_LEN: usize = 8;

impl TimelockAccount {
    /// Which custody path the lock uses
    pub fn asset_kind(&self) -> AssetKind {
        match self.token_mint {
            Some(mint) => AssetKind::Token(mint),
            None => AssetKind::Native,
        }
    }

    /// Lifecycle state of the record
    pub fn state(&self) -> LockState {
        if self.is_withdrawn {
            LockState::Withdrawn
        } else {
            LockState::Active
        }
    }

    /// Whether the maturity timestamp has been reached
    pub fn is_unlocked(&self, now: UnixTimestamp) -> bool {
        now >= self.unlock_timestamp
    }

    /// Seconds until maturity, never negative
    pub fn time_remaining(&self, now: UnixTimestamp) -> i64 {
        self.unlock_timestamp.saturating_sub(now).max(0)
    }

    /// Derivation seeds of this record's address
    pub fn lock_seeds(&self) -> LockSeeds {
        match self.token_mint {
            Some(mint) => {
                LockSeeds::token(&self.creator, self.unlock_timestamp, self.seed, &mint)
            }
            None => LockSeeds::native(&self.creator, self.unlock_timestamp, self.seed),
        }
    }
}

/// Presence flag then the key; the key bytes are zeroed for native locks
fn pack_mint(mint: &Option<Pubkey>, dst: &mut [u8; TOKEN_MINT_LEN]) {
    let (flag_dst, key_dst) = mut_array_refs![dst, 1, 32];
    match mint {
        Some(mint) => {
            flag_dst[0] = 1;
            *key_dst = mint.to_bytes();
        }
        None => {
            flag_dst[0] = 0;
            *key_dst = [0; 32];
        }
    }
}

fn unpack_mint(src: &[u8; TOKEN_MINT_LEN]) -> Result<Option<Pubkey>, ProgramError> {
    let (flag_src, key_src) = array_refs![src, 1, 32];
    match flag_src[0] {
        0 => Ok(None),
        1 => Ok(Some(Pubkey::new_from_array(*key_src))),
        _ => Err(TimelockError::UnpackError.into()),
    }
}

impl IsInitialized for TimelockAccount {
    fn is_initialized(&self) -> bool {
        // Records only exist once written by a create instruction
        true
    }
}

impl Sealed for TimelockAccount {}
impl Pack for TimelockAccount {
    const LEN: usize = TIMELOCK_ACCOUNT_SIZE;

    fn pack_into_slice(&self, dst: &mut [u8]) {
        let dst = array_mut_ref![dst, 0, TIMELOCK_ACCOUNT_SIZE];

        let (
            discriminator_dst,
            creator_dst,
            recipient_dst,
            amount_dst,
            unlock_timestamp_dst,
            created_at_dst,
            is_withdrawn_dst,
            bump_dst,
            token_mint_dst,
            seed_dst,
        ) = mut_array_refs![
            dst,
            DISCRIMINATOR_LEN,
            CREATOR_LEN,
            RECIPIENT_LEN,
            AMOUNT_LEN,
            UNLOCK_TIMESTAMP_LEN,
            CREATED_AT_LEN,
            IS_WITHDRAWN_LEN,
            BUMP_LEN,
            TOKEN_MINT_LEN,
            SEED_LEN
        ];

        *discriminator_dst = LOCK_ACCOUNT_DISCRIMINATOR;
        sol_memcpy(creator_dst, self.creator.as_ref(), 32);
        sol_memcpy(recipient_dst, self.recipient.as_ref(), 32);
        *amount_dst = self.amount.to_le_bytes();
        *unlock_timestamp_dst = self.unlock_timestamp.to_le_bytes();
        *created_at_dst = self.created_at.to_le_bytes();
        is_withdrawn_dst[0] = self.is_withdrawn as u8;
        bump_dst[0] = self.bump;
        pack_mint(&self.token_mint, token_mint_dst);
        *seed_dst = self.seed.to_le_bytes();
    }

    fn unpack_from_slice(src: &[u8]) -> Result<Self, ProgramError> {
        if src.len() < TIMELOCK_ACCOUNT_SIZE {
            return Err(TimelockError::UnpackError.into());
        }
        let src = array_ref![src, 0, TIMELOCK_ACCOUNT_SIZE];

        let (
            discriminator_src,
            creator_src,
            recipient_src,
            amount_src,
            unlock_timestamp_src,
            created_at_src,
            is_withdrawn_src,
            bump_src,
            token_mint_src,
            seed_src,
        ) = array_refs![
            src,
            DISCRIMINATOR_LEN,
            CREATOR_LEN,
            RECIPIENT_LEN,
            AMOUNT_LEN,
            UNLOCK_TIMESTAMP_LEN,
            CREATED_AT_LEN,
            IS_WITHDRAWN_LEN,
            BUMP_LEN,
            TOKEN_MINT_LEN,
            SEED_LEN
        ];

        if *discriminator_src != LOCK_ACCOUNT_DISCRIMINATOR {
            return Err(TimelockError::UnpackError.into());
        }

        let is_withdrawn = match is_withdrawn_src[0] {
            0 => false,
            1 => true,
            _ => return Err(TimelockError::UnpackError.into()),
        };

        let token_mint = unpack_mint(token_mint_src)?;

        Ok(TimelockAccount {
            creator: Pubkey::new_from_array(*creator_src),
            recipient: Pubkey::new_from_array(*recipient_src),
            amount: u64::from_le_bytes(*amount_src),
            unlock_timestamp: i64::from_le_bytes(*unlock_timestamp_src),
            created_at: i64::from_le_bytes(*created_at_src),
            is_withdrawn,
            bump: bump_src[0],
            token_mint,
            seed: u64::from_le_bytes(*seed_src),
        })
    }
}

/// Read-only projection returned by `GetTimelockInfo`
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct TimelockInfo {
    /// The depositor
    pub creator: Pubkey,
    /// The only identity allowed to withdraw
    pub recipient: Pubkey,
    /// Locked amount
    pub amount: u64,
    /// Maturity timestamp
    pub unlock_timestamp: UnixTimestamp,
    /// Creation timestamp
    pub created_at: UnixTimestamp,
    /// Whether the single withdrawal happened
    pub is_withdrawn: bool,
    /// `now >= unlock_timestamp`
    pub is_unlocked: bool,
    /// `max(0, unlock_timestamp - now)`
    pub time_remaining: i64,
    /// Mint of a token lock
    pub token_mint: Option<Pubkey>,
}

impl TimelockInfo {
    /// Projects a stored record against the given clock
    pub fn project(account: &TimelockAccount, now: UnixTimestamp) -> Self {
        TimelockInfo {
            creator: account.creator,
            recipient: account.recipient,
            amount: account.amount,
            unlock_timestamp: account.unlock_timestamp,
            created_at: account.created_at,
            is_withdrawn: account.is_withdrawn,
            is_unlocked: account.is_unlocked(now),
            time_remaining: account.time_remaining(now),
            token_mint: account.token_mint,
        }
    }

    /// Decodes `GetTimelockInfo` return data.
    ///
    /// The runtime strips trailing zero bytes from return data, so the input
    /// is padded back out before decoding.
    pub fn from_return_data(data: &[u8]) -> Result<Self, ProgramError> {
        let mut padded = data.to_vec();
        padded.resize(TIMELOCK_INFO_MAX_SIZE, 0);
        Self::deserialize(&mut padded.as_slice()).map_err(|_| TimelockError::UnpackError.into())
    }
}

const TIMELOCK_INFO_MAX_SIZE: usize = CREATOR_LEN
    + RECIPIENT_LEN
    + AMOUNT_LEN
    + UNLOCK_TIMESTAMP_LEN
    + CREATED_AT_LEN
    + 1
    + 1
    + 8
    + TOKEN_MINT_LEN;
