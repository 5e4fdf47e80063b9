#![allow(dead_code)]

use solana_program::{clock::Clock, program_pack::Pack, pubkey::Pubkey};
use solana_program_test::*;
use solana_sdk::{
    instruction::{Instruction, InstructionError},
    signature::{Keypair, Signer},
    system_instruction,
    transaction::{Transaction, TransactionError},
};
use spl_token::state::{Account as TokenAccount, Mint};

use timelock_wallet::{error::TimelockError, state::TimelockAccount};

pub fn program_test() -> ProgramTest {
    ProgramTest::new(
        "timelock_wallet",
        timelock_wallet::id(),
        processor!(timelock_wallet::entrypoint::process_instruction),
    )
}

pub async fn start() -> ProgramTestContext {
    program_test().start_with_context().await
}

fn signed(ctx: &ProgramTestContext, ixs: &[Instruction], extra_signers: &[&Keypair]) -> Transaction {
    let mut signers: Vec<&Keypair> = Vec::with_capacity(1 + extra_signers.len());
    signers.push(&ctx.payer);
    signers.extend_from_slice(extra_signers);

    let mut tx = Transaction::new_with_payer(ixs, Some(&ctx.payer.pubkey()));
    tx.sign(&signers, ctx.last_blockhash);
    tx
}

/// Sends under a fresh blockhash so that repeating an instruction is a new transaction
pub async fn try_tx(
    ctx: &mut ProgramTestContext,
    ixs: &[Instruction],
    extra_signers: &[&Keypair],
) -> Result<(), BanksClientError> {
    ctx.last_blockhash = ctx.get_new_latest_blockhash().await.unwrap();
    let tx = signed(ctx, ixs, extra_signers);
    ctx.banks_client.process_transaction(tx).await
}

pub async fn send_tx(ctx: &mut ProgramTestContext, ixs: &[Instruction], extra_signers: &[&Keypair]) {
    try_tx(ctx, ixs, extra_signers).await.unwrap();
}

pub async fn send_tx_expect_err(
    ctx: &mut ProgramTestContext,
    ixs: &[Instruction],
    extra_signers: &[&Keypair],
    expected: TimelockError,
) {
    let err = try_tx(ctx, ixs, extra_signers)
        .await
        .expect_err("transaction must fail");

    match err.unwrap() {
        TransactionError::InstructionError(_, InstructionError::Custom(code)) => {
            assert_eq!(code, expected as u32, "expected {:?}", expected)
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

/// Runs the transaction without committing it, returning its outcome and return data
pub async fn simulate(
    ctx: &mut ProgramTestContext,
    ixs: &[Instruction],
) -> (Result<(), TransactionError>, Option<Vec<u8>>) {
    ctx.last_blockhash = ctx.get_new_latest_blockhash().await.unwrap();
    let tx = signed(ctx, ixs, &[]);
    let simulation = ctx.banks_client.simulate_transaction(tx).await.unwrap();

    let result = simulation.result.expect("transaction was simulated");
    let return_data = simulation
        .simulation_details
        .and_then(|details| details.return_data)
        .map(|return_data| return_data.data);
    (result, return_data)
}

pub async fn now(ctx: &mut ProgramTestContext) -> i64 {
    let clock: Clock = ctx.banks_client.get_sysvar().await.unwrap();
    clock.unix_timestamp
}

pub async fn set_clock(ctx: &mut ProgramTestContext, unix_timestamp: i64) {
    let mut clock: Clock = ctx.banks_client.get_sysvar().await.unwrap();
    clock.unix_timestamp = unix_timestamp;
    ctx.set_sysvar(&clock);
}

pub async fn lamports(ctx: &mut ProgramTestContext, address: &Pubkey) -> u64 {
    ctx.banks_client
        .get_account(*address)
        .await
        .unwrap()
        .map(|account| account.lamports)
        .unwrap_or(0)
}

pub async fn account_exists(ctx: &mut ProgramTestContext, address: &Pubkey) -> bool {
    ctx.banks_client.get_account(*address).await.unwrap().is_some()
}

pub async fn load_lock(ctx: &mut ProgramTestContext, address: &Pubkey) -> TimelockAccount {
    let account = ctx
        .banks_client
        .get_account(*address)
        .await
        .unwrap()
        .expect("lock account exists");
    assert_eq!(account.owner, timelock_wallet::id());
    TimelockAccount::unpack(&account.data).unwrap()
}

pub async fn rent_reserve(ctx: &mut ProgramTestContext, space: usize) -> u64 {
    let rent = ctx.banks_client.get_rent().await.unwrap();
    rent.minimum_balance(space)
}

/// New system account holding `lamports`, funded by the payer
pub async fn funded_keypair(ctx: &mut ProgramTestContext, lamports: u64) -> Keypair {
    let keypair = Keypair::new();
    let ix = system_instruction::transfer(&ctx.payer.pubkey(), &keypair.pubkey(), lamports);
    send_tx(ctx, &[ix], &[]).await;
    keypair
}

pub async fn create_mint(ctx: &mut ProgramTestContext, mint_authority: &Pubkey) -> Pubkey {
    let mint = Keypair::new();
    let space = Mint::LEN;
    let lamports = rent_reserve(ctx, space).await;

    let create = system_instruction::create_account(
        &ctx.payer.pubkey(),
        &mint.pubkey(),
        lamports,
        space as u64,
        &spl_token::id(),
    );
    let init =
        spl_token::instruction::initialize_mint2(&spl_token::id(), &mint.pubkey(), mint_authority, None, 6)
            .unwrap();

    send_tx(ctx, &[create, init], &[&mint]).await;
    mint.pubkey()
}

pub async fn create_token_account(ctx: &mut ProgramTestContext, mint: &Pubkey, owner: &Pubkey) -> Pubkey {
    let account = Keypair::new();
    let space = TokenAccount::LEN;
    let lamports = rent_reserve(ctx, space).await;

    let create = system_instruction::create_account(
        &ctx.payer.pubkey(),
        &account.pubkey(),
        lamports,
        space as u64,
        &spl_token::id(),
    );
    let init =
        spl_token::instruction::initialize_account3(&spl_token::id(), &account.pubkey(), mint, owner)
            .unwrap();

    send_tx(ctx, &[create, init], &[&account]).await;
    account.pubkey()
}

pub async fn mint_to(
    ctx: &mut ProgramTestContext,
    mint: &Pubkey,
    destination: &Pubkey,
    mint_authority: &Keypair,
    amount: u64,
) {
    let ix = spl_token::instruction::mint_to(
        &spl_token::id(),
        mint,
        destination,
        &mint_authority.pubkey(),
        &[],
        amount,
    )
    .unwrap();

    send_tx(ctx, &[ix], &[mint_authority]).await;
}

pub async fn token_balance(ctx: &mut ProgramTestContext, address: &Pubkey) -> u64 {
    let account = ctx
        .banks_client
        .get_account(*address)
        .await
        .unwrap()
        .expect("token account exists");
    TokenAccount::unpack(&account.data).unwrap().amount
}
