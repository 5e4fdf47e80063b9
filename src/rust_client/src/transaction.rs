use anyhow::{anyhow, Context, Result};
use solana_account_decoder::UiAccountEncoding;
use solana_client::{
    rpc_client::RpcClient,
    rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig},
    rpc_filter::{Memcmp, RpcFilterType},
};
use solana_program::{
    clock::{Clock, UnixTimestamp},
    instruction::Instruction,
    program_pack::Pack,
    pubkey::Pubkey,
    sysvar,
};
use solana_sdk::{
    account::from_account,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::Transaction,
};
use timelock_wallet::{
    constants::LOCK_ACCOUNT_DISCRIMINATOR,
    instruction,
    state::{TimelockAccount, TIMELOCK_ACCOUNT_SIZE},
};

/// Offset of the creator key inside a lock record
const CREATOR_OFFSET: usize = 8;

pub const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

pub fn check_balance(rpc_client: &RpcClient, public_key: &Pubkey) -> Result<f64> {
    let lamports = rpc_client
        .get_balance(public_key)
        .with_context(|| format!("fetch balance of {public_key}"))?;
    Ok(lamports as f64 / LAMPORTS_PER_SOL)
}

fn send(rpc_client: &RpcClient, instructions: &[Instruction], payer: &Keypair) -> Result<Signature> {
    let mut transaction = Transaction::new_with_payer(instructions, Some(&payer.pubkey()));

    let blockhash = rpc_client
        .get_latest_blockhash()
        .context("fetch latest blockhash")?;
    transaction.sign(&[payer], blockhash);

    rpc_client
        .send_and_confirm_transaction(&transaction)
        .context("send transaction")
}

pub fn create_lock(
    rpc_client: &RpcClient,
    program_id: &Pubkey,
    creator: &Keypair,
    lamports: u64,
    unlock_timestamp: UnixTimestamp,
    seed: u64,
    recipient: Option<Pubkey>,
) -> Result<(Pubkey, Signature)> {
    let (ix, lock) = instruction::initialize_lock(
        program_id,
        &creator.pubkey(),
        lamports,
        unlock_timestamp,
        seed,
        recipient,
    );
    let signature = send(rpc_client, &[ix], creator)?;
    Ok((lock, signature))
}

#[allow(clippy::too_many_arguments)]
pub fn create_token_lock(
    rpc_client: &RpcClient,
    program_id: &Pubkey,
    creator: &Keypair,
    mint: &Pubkey,
    source: &Pubkey,
    amount: u64,
    unlock_timestamp: UnixTimestamp,
    seed: u64,
    recipient: Option<Pubkey>,
) -> Result<(Pubkey, Signature)> {
    let (ix, lock) = instruction::initialize_token_lock(
        program_id,
        &creator.pubkey(),
        mint,
        source,
        amount,
        unlock_timestamp,
        seed,
        recipient,
    );
    let signature = send(rpc_client, &[ix], creator)?;
    Ok((lock, signature))
}

pub fn withdraw(
    rpc_client: &RpcClient,
    program_id: &Pubkey,
    lock: &Pubkey,
    recipient: &Keypair,
) -> Result<Signature> {
    let ix = instruction::withdraw(program_id, &recipient.pubkey(), lock);
    send(rpc_client, &[ix], recipient)
}

pub fn withdraw_token(
    rpc_client: &RpcClient,
    program_id: &Pubkey,
    lock: &Pubkey,
    destination: &Pubkey,
    recipient: &Keypair,
) -> Result<Signature> {
    let ix = instruction::withdraw_token(program_id, &recipient.pubkey(), lock, destination);
    send(rpc_client, &[ix], recipient)
}

/// Reads a lock record straight from its account
pub fn fetch_lock(
    rpc_client: &RpcClient,
    program_id: &Pubkey,
    lock: &Pubkey,
) -> Result<TimelockAccount> {
    let account = rpc_client
        .get_account(lock)
        .with_context(|| format!("no lock at {lock}"))?;
    if account.owner != *program_id {
        return Err(anyhow!("{lock} is not owned by {program_id}"));
    }
    TimelockAccount::unpack(&account.data).map_err(|err| anyhow!("{lock} is not a lock: {err}"))
}

/// Every lock record created by `creator`, in no particular order
pub fn list_locks(
    rpc_client: &RpcClient,
    program_id: &Pubkey,
    creator: &Pubkey,
) -> Result<Vec<(Pubkey, TimelockAccount)>> {
    let config = RpcProgramAccountsConfig {
        filters: Some(lock_filters(creator)),
        account_config: RpcAccountInfoConfig {
            encoding: Some(UiAccountEncoding::Base64),
            ..RpcAccountInfoConfig::default()
        },
        ..RpcProgramAccountsConfig::default()
    };
    let accounts = rpc_client
        .get_program_accounts_with_config(program_id, config)
        .with_context(|| format!("list locks of {creator}"))?;

    accounts
        .into_iter()
        .map(|(address, account)| {
            TimelockAccount::unpack(&account.data)
                .map(|record| (address, record))
                .map_err(|err| anyhow!("{address} is not a lock: {err}"))
        })
        .collect()
}

fn lock_filters(creator: &Pubkey) -> Vec<RpcFilterType> {
    vec![
        RpcFilterType::DataSize(TIMELOCK_ACCOUNT_SIZE as u64),
        RpcFilterType::Memcmp(Memcmp::new_base58_encoded(0, &LOCK_ACCOUNT_DISCRIMINATOR)),
        RpcFilterType::Memcmp(Memcmp::new_base58_encoded(CREATOR_OFFSET, creator.as_ref())),
    ]
}

/// The cluster's clock, which is what withdrawals are judged against
pub fn cluster_time(rpc_client: &RpcClient) -> Result<UnixTimestamp> {
    let account = rpc_client
        .get_account(&sysvar::clock::id())
        .context("fetch clock sysvar")?;
    let clock: Clock = from_account(&account).ok_or_else(|| anyhow!("malformed clock sysvar"))?;
    Ok(clock.unix_timestamp)
}
