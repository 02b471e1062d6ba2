mod common;

use axum::http::StatusCode;
use common::{TestApp, access};
use rstest::rstest;
use serde_json::{Value, json};

async fn balance(app: &TestApp, token: &str, currency: &str) -> Value {
    let (status, body) = app
        .get(&format!("/cash/balance?currency={currency}"), token)
        .await;
    assert_eq!(status, StatusCode::OK);
    body["balance"].clone()
}

#[tokio::test]
async fn deposit_then_balance() {
    let app = TestApp::new().await;
    let tokens = app.signup("alice").await;
    let token = access(&tokens);

    let (status, entry) = app
        .post("/cash", token, json!({ "amount": 500, "type": "Deposit", "notes": "paycheck" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["entry_type"], "cash_deposit");
    assert_eq!(entry["created"], true);

    let lines = entry["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().any(|l| l["side"] == "debit" && l["amount"] == json!(500.0)));
    assert!(lines.iter().any(|l| l["side"] == "credit" && l["amount"] == json!(500.0)));

    let (status, body) = app.get("/cash/balance", token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "currency": "USD", "balance": 500.0 }));
}

#[tokio::test]
async fn withdraw_beyond_balance_goes_negative() {
    let app = TestApp::new().await;
    let tokens = app.signup("bob").await;
    let token = access(&tokens);

    app.post("/cash/add", token, json!({ "amount": 100, "action": "deposit" }))
        .await;
    let (status, entry) = app
        .post("/cash/add", token, json!({ "amount": 250.5, "direction": "Withdrawal" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["entry_type"], "cash_withdraw");

    assert_eq!(balance(&app, token, "USD").await, json!(-150.5));
}

#[tokio::test]
async fn balances_are_per_currency_and_per_user() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;

    app.post("/cash", access(&alice), json!({ "amount": 40, "currency": "eur" }))
        .await;
    app.post("/cash", access(&alice), json!({ "amount": 10 })).await;

    assert_eq!(balance(&app, access(&alice), "EUR").await, json!(40.0));
    assert_eq!(balance(&app, access(&alice), "usd").await, json!(10.0));
    assert_eq!(balance(&app, access(&bob), "USD").await, json!(0.0));
}

#[rstest]
#[case(json!({ "amount": 0 }))]
#[case(json!({ "amount": -5 }))]
#[case(json!({ "amount": 10_000_000_000_000_000_u64 }))]
#[case(json!({ "amount": 10, "direction": "sideways" }))]
#[case(json!({ "direction": "deposit" }))]
#[case(json!({ "amount": 10, "currency": "dollars" }))]
#[case(json!({ "amount": 10, "date": "last tuesday" }))]
#[tokio::test]
async fn invalid_cash_input_is_rejected(#[case] payload: Value) {
    let app = TestApp::new().await;
    let tokens = app.signup("carol").await;

    let (status, body) = app.post("/cash", access(&tokens), payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");

    let (_, ledger) = app.get("/ledger/entries", access(&tokens)).await;
    assert!(ledger.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn idempotency_key_replays_the_first_entry() {
    let app = TestApp::new().await;
    let tokens = app.signup("dave").await;
    let token = access(&tokens);
    let payload = json!({ "amount": 75, "idempotency_key": "dep-1" });

    let (status, first) = app.post("/cash", token, payload.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, second) = app.post("/cash", token, payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["created"], false);
    assert_eq!(second["entry_id"], first["entry_id"]);

    assert_eq!(balance(&app, token, "USD").await, json!(75.0));
}

#[tokio::test]
async fn explicit_account_must_be_owned() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;

    let (_, entry) = app.post("/cash", access(&alice), json!({ "amount": 5 })).await;
    let alice_cash = entry["lines"]
        .as_array()
        .unwrap()
        .iter()
        .find(|l| l["side"] == "debit")
        .unwrap()["account_id"]
        .clone();

    let (status, _) = app
        .post(
            "/cash",
            access(&bob),
            json!({ "amount": 5, "account_id": alice_cash }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post(
            "/cash",
            access(&alice),
            json!({ "amount": 5, "account_id": alice_cash, "currency": "EUR" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/cash",
            access(&alice),
            json!({ "amount": 5, "account_id": alice_cash, "type": "w" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(balance(&app, access(&alice), "USD").await, json!(0.0));
}

#[tokio::test]
async fn ledger_views_stay_balanced() {
    let app = TestApp::new().await;
    let tokens = app.signup("erin").await;
    let token = access(&tokens);

    app.post("/cash", token, json!({ "amount": 200, "date": "2020-01-15" }))
        .await;
    app.post("/cash", token, json!({ "amount": 50, "type": "withdraw", "note": "rent" }))
        .await;

    let (status, accounts) = app.get("/ledger/accounts", token).await;
    assert_eq!(status, StatusCode::OK);
    let accounts = accounts.as_array().unwrap();
    assert_eq!(accounts.len(), 2);
    let cash = accounts.iter().find(|a| a["name"] == "Cash").unwrap();
    assert_eq!(cash["kind"], "asset");
    assert_eq!(cash["balance"], json!(150.0));
    let clearing = accounts.iter().find(|a| a["name"] == "External Cash").unwrap();
    assert_eq!(clearing["balance"], json!(-150.0));

    let (status, rows) = app.get("/ledger/entries?limit=1", token).await;
    assert_eq!(status, StatusCode::OK);
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r["entry_type"] == "cash_withdraw"));

    let (status, movements) = app.get("/cash", token).await;
    assert_eq!(status, StatusCode::OK);
    let movements = movements.as_array().unwrap();
    assert_eq!(movements.len(), 2);
    assert_eq!(movements[0]["action"], "withdraw");
    assert_eq!(movements[0]["notes"], "rent");
    assert_eq!(movements[1]["action"], "deposit");
    assert_eq!(movements[1]["amount"], json!(200.0));
}
