//! The definitions for Timelock instructions

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    clock::UnixTimestamp,
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};

use crate::pda::{derive_lock_address, derive_token_custody_address, derive_token_lock_address};

/// InitializeLock instruction data
#[derive(Clone, Debug, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct InitializeLock {
    /// The number of lamports to lock
    pub amount: u64,
    /// The time the lamports stay locked until
    pub unlock_timestamp: UnixTimestamp,
    /// Derivation seed, lets a creator hold several locks for the same second
    pub seed: u64,
    /// Who may withdraw; the creator when `None`
    pub recipient: Option<Pubkey>,
}

/// InitializeTokenLock instruction data
#[derive(Clone, Debug, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct InitializeTokenLock {
    /// The number of token base units to lock
    pub amount: u64,
    /// The time the tokens stay locked until
    pub unlock_timestamp: UnixTimestamp,
    /// Derivation seed
    pub seed: u64,
    /// Who may withdraw; the creator when `None`
    pub recipient: Option<Pubkey>,
}

/// A Timelock instruction
#[derive(Clone, Debug, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub enum TimelockInstruction {
    /// Lock SOL until a unix timestamp
    /// Requires that the lock address holds no record.
    ///
    /// Transitions:
    /// NonExistent -> Active
    ///
    /// # Account references
    ///   0. `[SIGNER, WRITE]` Creator account
    ///   1. `[WRITE]` Lock account, derived from (creator, unlock_timestamp, seed)
    ///   2. `[]` System program account
    InitializeLock(InitializeLock),

    /// Lock SPL tokens until a unix timestamp
    /// Requires that the lock address and the custody address hold nothing.
    ///
    /// Transitions:
    /// NonExistent -> Active
    ///
    /// # Account references
    ///   0. `[SIGNER, WRITE]` Creator account
    ///   1. `[WRITE]` Lock account, derived from (creator, unlock_timestamp, seed, mint)
    ///   2. `[]` Token mint
    ///   3. `[WRITE]` Creator token account
    ///   4. `[WRITE]` Custody token account, derived from the lock account
    ///   5. `[]` SPL Token program account
    ///   6. `[]` System program account
    InitializeTokenLock(InitializeTokenLock),

    /// Withdraw the SOL of a matured native lock
    /// Requires that the lock is unlocked, not withdrawn, and the signer is its recipient.
    ///
    /// Transitions:
    /// Active -> Withdrawn
    ///
    /// # Account references
    ///   0. `[SIGNER, WRITE]` Recipient account
    ///   1. `[WRITE]` Lock account
    Withdraw,

    /// Withdraw the tokens of a matured token lock
    /// Requires that the lock is unlocked, not withdrawn, and the signer is its recipient.
    ///
    /// Transitions:
    /// Active -> Withdrawn
    ///
    /// # Account references
    ///   0. `[SIGNER]` Recipient account
    ///   1. `[WRITE]` Lock account
    ///   2. `[WRITE]` Custody token account
    ///   3. `[WRITE]` Recipient token account
    ///   4. `[]` SPL Token program account
    WithdrawToken,

    /// Read a lock; the `TimelockInfo` projection is set as return data.
    /// Never mutates.
    ///
    /// # Account references
    ///   0. `[]` Lock account
    GetTimelockInfo,
}

/// Builds an `InitializeLock` instruction, returning it with the lock address
pub fn initialize_lock(
    program_id: &Pubkey,
    creator: &Pubkey,
    amount: u64,
    unlock_timestamp: UnixTimestamp,
    seed: u64,
    recipient: Option<Pubkey>,
) -> (Instruction, Pubkey) {
    let (lock, _) = derive_lock_address(program_id, creator, unlock_timestamp, seed);
    let ix = Instruction::new_with_borsh(
        *program_id,
        &TimelockInstruction::InitializeLock(InitializeLock {
            amount,
            unlock_timestamp,
            seed,
            recipient,
        }),
        vec![
            AccountMeta::new(*creator, true),
            AccountMeta::new(lock, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
    );
    (ix, lock)
}

/// Builds an `InitializeTokenLock` instruction, returning it with the lock address
#[allow(clippy::too_many_arguments)]
pub fn initialize_token_lock(
    program_id: &Pubkey,
    creator: &Pubkey,
    mint: &Pubkey,
    creator_token_account: &Pubkey,
    amount: u64,
    unlock_timestamp: UnixTimestamp,
    seed: u64,
    recipient: Option<Pubkey>,
) -> (Instruction, Pubkey) {
    let (lock, _) = derive_token_lock_address(program_id, creator, unlock_timestamp, seed, mint);
    let (custody, _) = derive_token_custody_address(program_id, &lock);
    let ix = Instruction::new_with_borsh(
        *program_id,
        &TimelockInstruction::InitializeTokenLock(InitializeTokenLock {
            amount,
            unlock_timestamp,
            seed,
            recipient,
        }),
        vec![
            AccountMeta::new(*creator, true),
            AccountMeta::new(lock, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new(*creator_token_account, false),
            AccountMeta::new(custody, false),
            AccountMeta::new_readonly(spl_token::id(), false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
    );
    (ix, lock)
}

/// Builds a `Withdraw` instruction
pub fn withdraw(program_id: &Pubkey, recipient: &Pubkey, lock: &Pubkey) -> Instruction {
    Instruction::new_with_borsh(
        *program_id,
        &TimelockInstruction::Withdraw,
        vec![
            AccountMeta::new(*recipient, true),
            AccountMeta::new(*lock, false),
        ],
    )
}

/// Builds a `WithdrawToken` instruction
pub fn withdraw_token(
    program_id: &Pubkey,
    recipient: &Pubkey,
    lock: &Pubkey,
    recipient_token_account: &Pubkey,
) -> Instruction {
    let (custody, _) = derive_token_custody_address(program_id, lock);
    Instruction::new_with_borsh(
        *program_id,
        &TimelockInstruction::WithdrawToken,
        vec![
            AccountMeta::new_readonly(*recipient, true),
            AccountMeta::new(*lock, false),
            AccountMeta::new(custody, false),
            AccountMeta::new(*recipient_token_account, false),
            AccountMeta::new_readonly(spl_token::id(), false),
        ],
    )
}

/// Builds a `GetTimelockInfo` instruction
pub fn get_timelock_info(program_id: &Pubkey, lock: &Pubkey) -> Instruction {
    Instruction::new_with_borsh(
        *program_id,
        &TimelockInstruction::GetTimelockInfo,
        vec![AccountMeta::new_readonly(*lock, false)],
    )
}
