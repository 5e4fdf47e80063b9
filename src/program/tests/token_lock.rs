mod common;

use common::*;
use solana_program::{program_pack::Pack, pubkey::Pubkey};
use solana_program_test::*;
use solana_sdk::signature::{Keypair, Signer};
use spl_token::state::Account as TokenAccount;

use timelock_wallet::{
    error::TimelockError,
    instruction,
    pda::{derive_token_custody_address, derive_token_lock_address},
};

struct TokenFixture {
    mint: Pubkey,
    mint_authority: Keypair,
    source: Pubkey,
}

async fn token_fixture(ctx: &mut ProgramTestContext, balance: u64) -> TokenFixture {
    let creator = ctx.payer.pubkey();
    let mint_authority = Keypair::new();
    let mint = create_mint(ctx, &mint_authority.pubkey()).await;
    let source = create_token_account(ctx, &mint, &creator).await;
    mint_to(ctx, &mint, &source, &mint_authority, balance).await;

    TokenFixture {
        mint,
        mint_authority,
        source,
    }
}

#[tokio::test]
async fn token_lock_round_trip() {
    let mut ctx = start().await;
    let program_id = timelock_wallet::id();
    let creator = ctx.payer.pubkey();
    let recipient = Keypair::new();
    let fixture = token_fixture(&mut ctx, 5_000_000).await;
    let destination = create_token_account(&mut ctx, &fixture.mint, &recipient.pubkey()).await;

    let t0 = now(&mut ctx).await;
    let (ix, lock) = instruction::initialize_token_lock(
        &program_id,
        &creator,
        &fixture.mint,
        &fixture.source,
        3_000_000,
        t0 + 100,
        0,
        Some(recipient.pubkey()),
    );
    send_tx(&mut ctx, &[ix], &[]).await;

    assert_eq!(
        derive_token_lock_address(&program_id, &creator, t0 + 100, 0, &fixture.mint).0,
        lock
    );
    let (custody, _) = derive_token_custody_address(&program_id, &lock);

    let custody_account = ctx.banks_client.get_account(custody).await.unwrap().unwrap();
    let custody_state = TokenAccount::unpack(&custody_account.data).unwrap();
    assert_eq!(custody_state.mint, fixture.mint);
    assert_eq!(custody_state.owner, lock);
    assert_eq!(custody_state.amount, 3_000_000);
    assert_eq!(token_balance(&mut ctx, &fixture.source).await, 2_000_000);

    let record = load_lock(&mut ctx, &lock).await;
    assert_eq!(record.token_mint, Some(fixture.mint));
    assert_eq!(record.amount, 3_000_000);

    let withdraw =
        instruction::withdraw_token(&program_id, &recipient.pubkey(), &lock, &destination);

    send_tx_expect_err(&mut ctx, &[withdraw.clone()], &[&recipient], TimelockError::StillLocked)
        .await;

    set_clock(&mut ctx, t0 + 100).await;
    send_tx(&mut ctx, &[withdraw.clone()], &[&recipient]).await;

    assert_eq!(token_balance(&mut ctx, &destination).await, 3_000_000);
    assert_eq!(token_balance(&mut ctx, &custody).await, 0);
    assert!(load_lock(&mut ctx, &lock).await.is_withdrawn);

    send_tx_expect_err(&mut ctx, &[withdraw], &[&recipient], TimelockError::AlreadyWithdrawn)
        .await;
    assert_eq!(token_balance(&mut ctx, &destination).await, 3_000_000);
}

#[tokio::test]
async fn token_lock_minimum_amount() {
    let mut ctx = start().await;
    let program_id = timelock_wallet::id();
    let creator = ctx.payer.pubkey();
    let fixture = token_fixture(&mut ctx, 1_000_000).await;
    let t0 = now(&mut ctx).await;

    let (ix, lock) = instruction::initialize_token_lock(
        &program_id,
        &creator,
        &fixture.mint,
        &fixture.source,
        9_999,
        t0 + 100,
        0,
        None,
    );
    send_tx_expect_err(&mut ctx, &[ix], &[], TimelockError::MinimumAmount).await;
    assert!(!account_exists(&mut ctx, &lock).await);
    assert_eq!(token_balance(&mut ctx, &fixture.source).await, 1_000_000);
}

#[tokio::test]
async fn token_lock_needs_the_tokens() {
    let mut ctx = start().await;
    let program_id = timelock_wallet::id();
    let creator = ctx.payer.pubkey();
    let fixture = token_fixture(&mut ctx, 20_000).await;
    let t0 = now(&mut ctx).await;

    let (ix, lock) = instruction::initialize_token_lock(
        &program_id,
        &creator,
        &fixture.mint,
        &fixture.source,
        30_000,
        t0 + 100,
        0,
        None,
    );
    send_tx_expect_err(&mut ctx, &[ix], &[], TimelockError::InsufficientFunds).await;
    assert!(!account_exists(&mut ctx, &lock).await);
    assert_eq!(token_balance(&mut ctx, &fixture.source).await, 20_000);
}

#[tokio::test]
async fn token_withdraw_rejects_native_locks() {
    let mut ctx = start().await;
    let program_id = timelock_wallet::id();
    let creator = ctx.payer.pubkey();
    let fixture = token_fixture(&mut ctx, 20_000).await;
    let t0 = now(&mut ctx).await;

    let (ix, lock) = instruction::initialize_lock(&program_id, &creator, 1_000_000, t0 + 10, 0, None);
    send_tx(&mut ctx, &[ix], &[]).await;
    set_clock(&mut ctx, t0 + 10).await;

    send_tx_expect_err(
        &mut ctx,
        &[instruction::withdraw_token(&program_id, &creator, &lock, &fixture.source)],
        &[],
        TimelockError::NotTokenAccount,
    )
    .await;
}

#[tokio::test]
async fn token_withdraw_checks_the_destination_mint() {
    let mut ctx = start().await;
    let program_id = timelock_wallet::id();
    let creator = ctx.payer.pubkey();
    let fixture = token_fixture(&mut ctx, 20_000).await;

    let other_mint = create_mint(&mut ctx, &fixture.mint_authority.pubkey()).await;
    let wrong_destination = create_token_account(&mut ctx, &other_mint, &creator).await;

    let t0 = now(&mut ctx).await;
    let (ix, lock) = instruction::initialize_token_lock(
        &program_id,
        &creator,
        &fixture.mint,
        &fixture.source,
        20_000,
        t0 + 10,
        0,
        None,
    );
    send_tx(&mut ctx, &[ix], &[]).await;
    set_clock(&mut ctx, t0 + 10).await;

    send_tx_expect_err(
        &mut ctx,
        &[instruction::withdraw_token(&program_id, &creator, &lock, &wrong_destination)],
        &[],
        TimelockError::InvalidTokenAccount,
    )
    .await;

    let (custody, _) = derive_token_custody_address(&program_id, &lock);
    assert_eq!(token_balance(&mut ctx, &custody).await, 20_000);
    assert!(!load_lock(&mut ctx, &lock).await.is_withdrawn);

    // The creator is the default recipient and may use its own source account
    send_tx(
        &mut ctx,
        &[instruction::withdraw_token(&program_id, &creator, &lock, &fixture.source)],
        &[],
    )
    .await;
    assert_eq!(token_balance(&mut ctx, &fixture.source).await, 20_000);
}

#[tokio::test]
async fn token_withdraw_by_a_stranger_is_rejected() {
    let mut ctx = start().await;
    let program_id = timelock_wallet::id();
    let creator = ctx.payer.pubkey();
    let recipient = Pubkey::new_unique();
    let stranger = Keypair::new();
    let fixture = token_fixture(&mut ctx, 20_000).await;
    let stranger_account = create_token_account(&mut ctx, &fixture.mint, &stranger.pubkey()).await;

    let t0 = now(&mut ctx).await;
    let (ix, lock) = instruction::initialize_token_lock(
        &program_id,
        &creator,
        &fixture.mint,
        &fixture.source,
        20_000,
        t0 + 10,
        0,
        Some(recipient),
    );
    send_tx(&mut ctx, &[ix], &[]).await;
    let stranger_withdraw =
        instruction::withdraw_token(&program_id, &stranger.pubkey(), &lock, &stranger_account);

    send_tx_expect_err(
        &mut ctx,
        &[stranger_withdraw.clone()],
        &[&stranger],
        TimelockError::UnauthorizedRecipient,
    )
    .await;

    set_clock(&mut ctx, t0 + 10).await;
    send_tx_expect_err(
        &mut ctx,
        &[stranger_withdraw],
        &[&stranger],
        TimelockError::UnauthorizedRecipient,
    )
    .await;
    assert_eq!(token_balance(&mut ctx, &stranger_account).await, 0);
}

#[tokio::test]
async fn custody_cannot_be_the_destination() {
    let mut ctx = start().await;
    let program_id = timelock_wallet::id();
    let creator = ctx.payer.pubkey();
    let fixture = token_fixture(&mut ctx, 20_000).await;

    let t0 = now(&mut ctx).await;
    let (ix, lock) = instruction::initialize_token_lock(
        &program_id,
        &creator,
        &fixture.mint,
        &fixture.source,
        20_000,
        t0 + 10,
        0,
        None,
    );
    send_tx(&mut ctx, &[ix], &[]).await;
    set_clock(&mut ctx, t0 + 10).await;

    let (custody, _) = derive_token_custody_address(&program_id, &lock);
    send_tx_expect_err(
        &mut ctx,
        &[instruction::withdraw_token(&program_id, &creator, &lock, &custody)],
        &[],
        TimelockError::InvalidTokenAccount,
    )
    .await;

    assert!(!load_lock(&mut ctx, &lock).await.is_withdrawn);
    assert_eq!(token_balance(&mut ctx, &custody).await, 20_000);
}
