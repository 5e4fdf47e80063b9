//! Protocol constants

/// Smallest native lock, in lamports (0.001 SOL)
pub const MINIMUM_NATIVE_AMOUNT: u64 = 1_000_000;

/// Smallest token lock, in base units (0.01 of a 6-decimal token)
pub const MINIMUM_TOKEN_AMOUNT: u64 = 10_000;

/// Seed tag of every lock address
pub const LOCK_SEED_TAG: &[u8] = b"timelock";

/// Seed tag of the custody token account of a token lock
pub const CUSTODY_SEED_TAG: &[u8] = b"token_account";

/// Leading bytes of every persisted lock record
pub const LOCK_ACCOUNT_DISCRIMINATOR: [u8; 8] = [95, 235, 115, 186, 0, 160, 22, 33];

/// Log data prefix of a `LockCreated` event
pub const LOCK_CREATED_DISCRIMINATOR: [u8; 8] = [139, 109, 102, 198, 148, 128, 43, 152];

/// Log data prefix of a `FundsWithdrawn` event
pub const FUNDS_WITHDRAWN_DISCRIMINATOR: [u8; 8] = [56, 130, 230, 154, 35, 92, 11, 118];
