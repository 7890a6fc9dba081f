/// HTTP integration tests against an in-process server on an ephemeral port.
///
/// Each test spawns its own server with fresh state, so bet ids and balances
/// are deterministic per test. Winners are read from the take response since
/// resolution follows wall-clock parity.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use moneydrain_ledger::app_state::AppState;
use moneydrain_ledger::escrow::UNIT;
use moneydrain_ledger::routes::router;

const OWNER: &str = "OWNER_TEST";
const ALICE: &str = "L1ALICE000000001";
const BOB: &str = "L1BOB00000000001";

// ============================================================================
// REQUEST/RESPONSE BODIES
// ============================================================================
// Money fields are u128 (wei-scale values exceed u64), so bodies go through
// typed structs rather than serde_json::Value.

#[derive(Serialize)]
struct BetBody<'a> {
    account: &'a str,
    amount: u128,
}

#[derive(Serialize)]
struct AccountBody<'a> {
    account: &'a str,
}

#[derive(Deserialize)]
struct OpenResponse {
    success: bool,
    bet_id: Option<u64>,
    new_balance: Option<u128>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct TakeResponse {
    success: bool,
    winner: Option<String>,
    pot: Option<u128>,
    new_balance: Option<u128>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct WithdrawResponse {
    success: bool,
    winner: Option<String>,
    payout: Option<u128>,
    fee: Option<u128>,
    new_balance: Option<u128>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct ConnectResponse {
    success: bool,
    balance: u128,
    is_new_account: bool,
}

#[derive(Deserialize)]
struct BalanceResponse {
    balance: u128,
}

// ============================================================================
// HELPERS
// ============================================================================

async fn spawn_server() -> String {
    let state = Arc::new(Mutex::new(AppState::new(OWNER)));
    let app = router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn connect(client: &reqwest::Client, base_url: &str, account: &str) -> ConnectResponse {
    client
        .post(format!("{}/accounts/connect", base_url))
        .json(&AccountBody { account })
        .send()
        .await
        .expect("Failed to connect account")
        .json()
        .await
        .expect("Failed to parse connect response")
}

async fn balance_of(client: &reqwest::Client, base_url: &str, account: &str) -> u128 {
    let body: BalanceResponse = client
        .get(format!("{}/balance/{}", base_url, account))
        .send()
        .await
        .expect("Failed to get balance")
        .json()
        .await
        .expect("Failed to parse balance");
    body.balance
}

// ============================================================================
// TESTS
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let base_url = spawn_server().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/health", base_url))
        .send()
        .await
        .expect("Failed to reach server");

    assert_eq!(response.status(), 200);
    let body = response.text().await.expect("Failed to read body");
    assert!(body.contains("Online"));
}

#[tokio::test]
async fn test_connect_funds_new_accounts_once() {
    let base_url = spawn_server().await;
    let client = reqwest::Client::new();

    let first = connect(&client, &base_url, ALICE).await;
    assert!(first.success);
    assert!(first.is_new_account);
    assert_eq!(first.balance, 1000 * UNIT);

    let second = connect(&client, &base_url, ALICE).await;
    assert!(second.success);
    assert!(!second.is_new_account);
    assert_eq!(second.balance, 1000 * UNIT);
}

#[tokio::test]
async fn test_owner_and_counter() {
    let base_url = spawn_server().await;
    let client = reqwest::Client::new();

    let owner: serde_json::Value = client
        .get(format!("{}/owner", base_url))
        .send()
        .await
        .expect("Failed to get owner")
        .json()
        .await
        .expect("Failed to parse owner");
    assert_eq!(owner["owner"], OWNER);

    let counter: serde_json::Value = client
        .get(format!("{}/counter", base_url))
        .send()
        .await
        .expect("Failed to get counter")
        .json()
        .await
        .expect("Failed to parse counter");
    assert_eq!(counter["counter"], 0);
}

#[tokio::test]
async fn test_full_bet_lifecycle_over_http() {
    let base_url = spawn_server().await;
    let client = reqwest::Client::new();

    connect(&client, &base_url, ALICE).await;
    connect(&client, &base_url, BOB).await;

    let stake = 42 * UNIT;

    // Alice opens the bet
    let response = client
        .post(format!("{}/bets", base_url))
        .json(&BetBody { account: ALICE, amount: stake })
        .send()
        .await
        .expect("Failed to open bet");
    assert_eq!(response.status(), 200);
    let open: OpenResponse = response.json().await.expect("Failed to parse open response");
    assert!(open.success, "open failed: {:?}", open.error);
    let bet_id = open.bet_id.expect("missing bet id");
    assert_eq!(open.new_balance, Some(958 * UNIT));

    let counter: serde_json::Value = client
        .get(format!("{}/counter", base_url))
        .send()
        .await
        .expect("Failed to get counter")
        .json()
        .await
        .expect("Failed to parse counter");
    assert_eq!(counter["counter"], 1);

    // Bob matches it; the response carries the resolved winner
    let response = client
        .post(format!("{}/bets/{}/take", base_url, bet_id))
        .json(&BetBody { account: BOB, amount: stake })
        .send()
        .await
        .expect("Failed to take bet");
    assert_eq!(response.status(), 200);
    let take: TakeResponse = response.json().await.expect("Failed to parse take response");
    assert!(take.success, "take failed: {:?}", take.error);
    assert_eq!(take.pot, Some(84 * UNIT));
    assert_eq!(take.new_balance, Some(958 * UNIT));

    let winner = take.winner.expect("missing winner");
    assert!(winner == ALICE || winner == BOB);
    let loser = if winner == ALICE { BOB } else { ALICE };
    let loser_before = balance_of(&client, &base_url, loser).await;

    // Winner collects the pot
    let response = client
        .post(format!("{}/bets/{}/withdraw", base_url, bet_id))
        .json(&AccountBody { account: winner.as_str() })
        .send()
        .await
        .expect("Failed to withdraw bet");
    assert_eq!(response.status(), 200);
    let withdraw: WithdrawResponse = response.json().await.expect("Failed to parse withdraw");
    assert!(withdraw.success, "withdraw failed: {:?}", withdraw.error);

    let fee = 84 * UNIT / 100;
    assert_eq!(withdraw.fee, Some(fee));
    assert_eq!(withdraw.payout, Some(84 * UNIT - fee));
    assert_eq!(withdraw.winner.as_deref(), Some(winner.as_str()));
    assert_eq!(withdraw.new_balance, Some(958 * UNIT + 84 * UNIT - fee));

    // fee lands with the operator, the loser is untouched by the withdrawal
    assert_eq!(balance_of(&client, &base_url, OWNER).await, fee);
    assert_eq!(balance_of(&client, &base_url, loser).await, loser_before);

    // and a second withdrawal is rejected
    let response = client
        .post(format!("{}/bets/{}/withdraw", base_url, bet_id))
        .json(&AccountBody { account: winner.as_str() })
        .send()
        .await
        .expect("Failed to send second withdraw");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn test_zero_stake_is_rejected_and_refunded() {
    let base_url = spawn_server().await;
    let client = reqwest::Client::new();

    connect(&client, &base_url, ALICE).await;

    let response = client
        .post(format!("{}/bets", base_url))
        .json(&BetBody { account: ALICE, amount: 0 })
        .send()
        .await
        .expect("Failed to send open request");
    assert_eq!(response.status(), 400);
    let open: OpenResponse = response.json().await.expect("Failed to parse open response");
    assert!(!open.success);
    assert!(open.error.expect("missing error").contains("greater than zero"));

    assert_eq!(balance_of(&client, &base_url, ALICE).await, 1000 * UNIT);
}

#[tokio::test]
async fn test_take_errors_leave_balances_unchanged() {
    let base_url = spawn_server().await;
    let client = reqwest::Client::new();

    connect(&client, &base_url, ALICE).await;
    connect(&client, &base_url, BOB).await;

    // unknown bet id
    let response = client
        .post(format!("{}/bets/42/take", base_url))
        .json(&BetBody { account: BOB, amount: 5 * UNIT })
        .send()
        .await
        .expect("Failed to send take request");
    assert_eq!(response.status(), 404);
    let take: TakeResponse = response.json().await.expect("Failed to parse take response");
    assert!(take.error.expect("missing error").contains("does not exist"));
    assert_eq!(balance_of(&client, &base_url, BOB).await, 1000 * UNIT);

    // mismatched stake, both directions
    let response = client
        .post(format!("{}/bets", base_url))
        .json(&BetBody { account: ALICE, amount: 10 * UNIT })
        .send()
        .await
        .expect("Failed to open bet");
    let open: OpenResponse = response.json().await.expect("Failed to parse open response");
    let bet_id = open.bet_id.expect("missing bet id");

    for wrong in [5 * UNIT, 11 * UNIT] {
        let response = client
            .post(format!("{}/bets/{}/take", base_url, bet_id))
            .json(&BetBody { account: BOB, amount: wrong })
            .send()
            .await
            .expect("Failed to send take request");
        assert_eq!(response.status(), 400);
        let take: TakeResponse = response.json().await.expect("Failed to parse take response");
        assert!(take.error.expect("missing error").contains("must match the bet value"));
        assert_eq!(balance_of(&client, &base_url, BOB).await, 1000 * UNIT);
    }

    // insufficient funds for the taker
    let response = client
        .post(format!("{}/bets/{}/take", base_url, bet_id))
        .json(&BetBody { account: "L1BROKE000000001", amount: 10 * UNIT })
        .send()
        .await
        .expect("Failed to send take request");
    assert_eq!(response.status(), 400);
    let take: TakeResponse = response.json().await.expect("Failed to parse take response");
    assert!(take.error.expect("missing error").contains("Insufficient balance"));
}

#[tokio::test]
async fn test_withdraw_preconditions_over_http() {
    let base_url = spawn_server().await;
    let client = reqwest::Client::new();

    connect(&client, &base_url, ALICE).await;
    connect(&client, &base_url, BOB).await;

    // unknown bet
    let response = client
        .post(format!("{}/bets/42/withdraw", base_url))
        .json(&AccountBody { account: ALICE })
        .send()
        .await
        .expect("Failed to send withdraw request");
    assert_eq!(response.status(), 404);

    // open but not yet taken
    let response = client
        .post(format!("{}/bets", base_url))
        .json(&BetBody { account: ALICE, amount: 5 * UNIT })
        .send()
        .await
        .expect("Failed to open bet");
    let open: OpenResponse = response.json().await.expect("Failed to parse open response");
    let bet_id = open.bet_id.expect("missing bet id");

    let response = client
        .post(format!("{}/bets/{}/withdraw", base_url, bet_id))
        .json(&AccountBody { account: ALICE })
        .send()
        .await
        .expect("Failed to send withdraw request");
    assert_eq!(response.status(), 409);
    let withdraw: WithdrawResponse = response.json().await.expect("Failed to parse withdraw");
    assert!(withdraw.error.expect("missing error").contains("not been taken"));

    // resolved, but the loser tries to collect
    let response = client
        .post(format!("{}/bets/{}/take", base_url, bet_id))
        .json(&BetBody { account: BOB, amount: 5 * UNIT })
        .send()
        .await
        .expect("Failed to take bet");
    let take: TakeResponse = response.json().await.expect("Failed to parse take response");
    let winner = take.winner.expect("missing winner");
    let loser = if winner == ALICE { BOB } else { ALICE };

    let response = client
        .post(format!("{}/bets/{}/withdraw", base_url, bet_id))
        .json(&AccountBody { account: loser })
        .send()
        .await
        .expect("Failed to send withdraw request");
    assert_eq!(response.status(), 401);
    let withdraw: WithdrawResponse = response.json().await.expect("Failed to parse withdraw");
    assert!(!withdraw.success);
    assert_eq!(balance_of(&client, &base_url, loser).await, 995 * UNIT);
}

#[tokio::test]
async fn test_bet_snapshot_and_withdrawal_feed() {
    let base_url = spawn_server().await;
    let client = reqwest::Client::new();

    connect(&client, &base_url, ALICE).await;
    connect(&client, &base_url, BOB).await;

    let response = client
        .get(format!("{}/bets/1", base_url))
        .send()
        .await
        .expect("Failed to get bet");
    assert_eq!(response.status(), 404);

    let response = client
        .post(format!("{}/bets", base_url))
        .json(&BetBody { account: ALICE, amount: 7 * UNIT })
        .send()
        .await
        .expect("Failed to open bet");
    let open: OpenResponse = response.json().await.expect("Failed to parse open response");
    let bet_id = open.bet_id.expect("missing bet id");

    let bet: serde_json::Value = client
        .get(format!("{}/bets/{}", base_url, bet_id))
        .send()
        .await
        .expect("Failed to get bet")
        .json()
        .await
        .expect("Failed to parse bet");
    assert_eq!(bet["requester"], ALICE);
    assert_eq!(bet["taken"], false);
    assert_eq!(bet["withdrawn"], false);

    let response = client
        .post(format!("{}/bets/{}/take", base_url, bet_id))
        .json(&BetBody { account: BOB, amount: 7 * UNIT })
        .send()
        .await
        .expect("Failed to take bet");
    let take: TakeResponse = response.json().await.expect("Failed to parse take response");
    let winner = take.winner.expect("missing winner");

    client
        .post(format!("{}/bets/{}/withdraw", base_url, bet_id))
        .json(&AccountBody { account: winner.as_str() })
        .send()
        .await
        .expect("Failed to withdraw bet");

    let feed: Vec<serde_json::Value> = client
        .get(format!("{}/withdrawals", base_url))
        .send()
        .await
        .expect("Failed to get withdrawals")
        .json()
        .await
        .expect("Failed to parse withdrawals");
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["bet_id"], bet_id);
    assert_eq!(feed[0]["winner"], winner);
}
