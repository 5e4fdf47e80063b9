use std::{fs, path::Path};

use anyhow::{anyhow, Context, Result};
use chrono::prelude::*;
use clap::{Parser, Subcommand};
use serde::Serialize;
use solana_client::rpc_client::RpcClient;
use solana_program::pubkey::Pubkey;
use solana_sdk::{signature::Keypair, signer::Signer};
use timelock_wallet::{
    pda::{derive_lock_address, derive_token_custody_address, derive_token_lock_address},
    state::{TimelockAccount, TimelockInfo},
};

mod transaction;

const URL_TESTNET: &str = "https://api.testnet.solana.com";
const URL_DEVNET: &str = "https://api.devnet.solana.com";
const URL_LOCAL: &str = "http://127.0.0.1:8899";

#[derive(Parser)]
#[command(name = "timelock-client", version, about = "Lock SOL or SPL tokens until a date")]
struct Cli {
    /// RPC endpoint, or one of `localnet`, `devnet`, `testnet`
    #[arg(long, env = "TIMELOCK_URL", default_value = "localnet", global = true)]
    url: String,
    /// Keypair file (JSON array of secret key bytes) that signs and pays
    #[arg(long, env = "TIMELOCK_KEYPAIR", default_value = "keys/key.json", global = true)]
    keypair: String,
    /// Timelock program id
    #[arg(long, env = "TIMELOCK_PROGRAM_ID", default_value_t = timelock_wallet::id(), global = true)]
    program_id: Pubkey,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the lock address (and custody address for a token lock)
    Address {
        #[arg(long)]
        creator: Option<Pubkey>,
        /// Unlock time as unix seconds or RFC 3339
        #[arg(long)]
        unlock: String,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long)]
        mint: Option<Pubkey>,
    },
    /// Lock lamports
    Lock {
        #[arg(long)]
        lamports: u64,
        /// Unlock time as unix seconds or RFC 3339
        #[arg(long)]
        unlock: String,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Defaults to the signer
        #[arg(long)]
        recipient: Option<Pubkey>,
    },
    /// Lock SPL tokens from one of the signer's token accounts
    LockToken {
        #[arg(long)]
        mint: Pubkey,
        #[arg(long)]
        source: Pubkey,
        /// Amount in base units
        #[arg(long)]
        amount: u64,
        /// Unlock time as unix seconds or RFC 3339
        #[arg(long)]
        unlock: String,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long)]
        recipient: Option<Pubkey>,
    },
    /// Withdraw a matured SOL lock
    Withdraw {
        lock: Pubkey,
    },
    /// Withdraw a matured token lock into `destination`
    WithdrawToken {
        lock: Pubkey,
        #[arg(long)]
        destination: Pubkey,
    },
    /// Show a lock as seen at the cluster's current time
    Info {
        lock: Pubkey,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show every lock created by `creator` (the signer by default)
    List {
        #[arg(long)]
        creator: Option<Pubkey>,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Serialize)]
struct InfoView {
    address: String,
    creator: String,
    recipient: String,
    amount: u64,
    asset: String,
    unlock_timestamp: i64,
    unlock_date: String,
    created_at: i64,
    is_withdrawn: bool,
    is_unlocked: bool,
    time_remaining: i64,
}

impl InfoView {
    fn new(address: &Pubkey, info: &TimelockInfo) -> Self {
        InfoView {
            address: address.to_string(),
            creator: info.creator.to_string(),
            recipient: info.recipient.to_string(),
            amount: info.amount,
            asset: info
                .token_mint
                .map(|mint| mint.to_string())
                .unwrap_or_else(|| "SOL".to_string()),
            unlock_timestamp: info.unlock_timestamp,
            unlock_date: format_timestamp(info.unlock_timestamp),
            created_at: info.created_at,
            is_withdrawn: info.is_withdrawn,
            is_unlocked: info.is_unlocked,
            time_remaining: info.time_remaining,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let program_id = cli.program_id;
    let rpc_client = RpcClient::new(resolve_url(&cli.url).to_string());

    match cli.command {
        Command::Address {
            creator,
            unlock,
            seed,
            mint,
        } => {
            let creator = match creator {
                Some(creator) => creator,
                None => read_keypair(&cli.keypair)?.pubkey(),
            };
            let unlock_timestamp = parse_unlock_time(&unlock)?;
            match mint {
                Some(mint) => {
                    let (lock, _) =
                        derive_token_lock_address(&program_id, &creator, unlock_timestamp, seed, &mint);
                    let (custody, _) = derive_token_custody_address(&program_id, &lock);
                    println!("Lock: {}", lock);
                    println!("Custody: {}", custody);
                }
                None => {
                    let (lock, _) = derive_lock_address(&program_id, &creator, unlock_timestamp, seed);
                    println!("Lock: {}", lock);
                }
            }
        }
        Command::Lock {
            lamports,
            unlock,
            seed,
            recipient,
        } => {
            let signer = read_keypair(&cli.keypair)?;
            let unlock_timestamp = parse_unlock_time(&unlock)?;

            println!("Signer: {}", signer.pubkey());
            println!("Locking {} lamports until {}...", lamports, format_timestamp(unlock_timestamp));
            let (lock, signature) = transaction::create_lock(
                &rpc_client,
                &program_id,
                &signer,
                lamports,
                unlock_timestamp,
                seed,
                recipient,
            )?;

            println!("Lock {} created: {}", lock, signature);
            println!(
                "Lock account balance: {:?}",
                transaction::check_balance(&rpc_client, &lock)?
            );
            println!(
                "Signer balance: {:?}",
                transaction::check_balance(&rpc_client, &signer.pubkey())?
            );
        }
        Command::LockToken {
            mint,
            source,
            amount,
            unlock,
            seed,
            recipient,
        } => {
            let signer = read_keypair(&cli.keypair)?;
            let unlock_timestamp = parse_unlock_time(&unlock)?;

            println!("Signer: {}", signer.pubkey());
            println!(
                "Locking {} of {} until {}...",
                amount,
                mint,
                format_timestamp(unlock_timestamp)
            );
            let (lock, signature) = transaction::create_token_lock(
                &rpc_client,
                &program_id,
                &signer,
                &mint,
                &source,
                amount,
                unlock_timestamp,
                seed,
                recipient,
            )?;

            let (custody, _) = derive_token_custody_address(&program_id, &lock);
            println!("Lock {} created: {}", lock, signature);
            println!("Custody: {}", custody);
        }
        Command::Withdraw { lock } => {
            let signer = read_keypair(&cli.keypair)?;
            let record = transaction::fetch_lock(&rpc_client, &program_id, &lock)?;
            report_wait(&rpc_client, &record)?;

            println!("Withdrawing {} lamports from {}...", record.amount, lock);
            let signature = transaction::withdraw(&rpc_client, &program_id, &lock, &signer)?;
            println!("Withdrew successfully: {}", signature);
            println!(
                "Signer balance: {:?}",
                transaction::check_balance(&rpc_client, &signer.pubkey())?
            );
        }
        Command::WithdrawToken { lock, destination } => {
            let signer = read_keypair(&cli.keypair)?;
            let record = transaction::fetch_lock(&rpc_client, &program_id, &lock)?;
            report_wait(&rpc_client, &record)?;

            println!("Withdrawing {} tokens from {} into {}...", record.amount, lock, destination);
            let signature =
                transaction::withdraw_token(&rpc_client, &program_id, &lock, &destination, &signer)?;
            println!("Withdrew successfully: {}", signature);
        }
        Command::Info { lock, json } => {
            let record = transaction::fetch_lock(&rpc_client, &program_id, &lock)?;
            let now = transaction::cluster_time(&rpc_client)?;
            let view = InfoView::new(&lock, &TimelockInfo::project(&record, now));

            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_info(&view);
            }
        }
        Command::List { creator, json } => {
            let creator = match creator {
                Some(creator) => creator,
                None => read_keypair(&cli.keypair)?.pubkey(),
            };
            let now = transaction::cluster_time(&rpc_client)?;
            let mut locks = transaction::list_locks(&rpc_client, &program_id, &creator)?;
            locks.sort_by_key(|(_, record)| record.unlock_timestamp);

            let views = locks
                .iter()
                .map(|(address, record)| InfoView::new(address, &TimelockInfo::project(record, now)))
                .collect::<Vec<_>>();

            if json {
                println!("{}", serde_json::to_string_pretty(&views)?);
            } else {
                println!("{} locks created by {}", views.len(), creator);
                for view in &views {
                    println!();
                    print_info(view);
                }
            }
        }
    }

    Ok(())
}

fn print_info(view: &InfoView) {
    println!("Lock: {}", view.address);
    println!("Creator: {}", view.creator);
    println!("Recipient: {}", view.recipient);
    println!("Asset: {}", view.asset);
    println!("Amount: {}", view.amount);
    println!("Unlocks: {}", view.unlock_date);
    println!("Created: {}", format_timestamp(view.created_at));
    println!("Withdrawn: {}", view.is_withdrawn);
    if view.is_unlocked {
        println!("Unlocked");
    } else {
        println!("Locked for another {} seconds", view.time_remaining);
    }
}

/// Prints how long is left on a lock; the program decides whether to reject
fn report_wait(rpc_client: &RpcClient, record: &TimelockAccount) -> Result<()> {
    let now = transaction::cluster_time(rpc_client)?;
    let remaining = record.time_remaining(now);
    if remaining > 0 {
        println!(
            "Lock matures at {}, {} seconds from now",
            format_timestamp(record.unlock_timestamp),
            remaining
        );
    }
    Ok(())
}

fn resolve_url(url: &str) -> &str {
    match url {
        "localnet" | "l" => URL_LOCAL,
        "devnet" | "d" => URL_DEVNET,
        "testnet" | "t" => URL_TESTNET,
        other => other,
    }
}

fn read_keypair(path: impl AsRef<Path>) -> Result<Keypair> {
    let path = path.as_ref();
    let keypair_secret_json: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?,
    )
    .with_context(|| format!("parse {}", path.display()))?;

    let keypair_secret = keypair_secret_json
        .as_array()
        .ok_or_else(|| anyhow!("{} is not a JSON array", path.display()))?
        .iter()
        .map(|value| {
            value
                .as_u64()
                .and_then(|byte| u8::try_from(byte).ok())
                .ok_or_else(|| anyhow!("{} holds a non-byte value", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    Keypair::from_bytes(&keypair_secret).map_err(|err| anyhow!("{}: {}", path.display(), err))
}

/// Accepts unix seconds or an RFC 3339 date
fn parse_unlock_time(value: &str) -> Result<i64> {
    if let Ok(timestamp) = value.parse::<i64>() {
        return Ok(timestamp);
    }
    DateTime::parse_from_rfc3339(value)
        .map(|date| date.timestamp())
        .with_context(|| format!("`{value}` is neither unix seconds nor an RFC 3339 date"))
}

fn format_timestamp(timestamp: i64) -> String {
    match Utc.timestamp_opt(timestamp, 0).single() {
        Some(date) => date.to_rfc3339(),
        None => timestamp.to_string(),
    }
}
