//! Integration tests for trades, orders, holdings and budget lines.

use chrono::{NaiveDate, Utc};
use million_core::{
    budget::BudgetKind,
    trading::{Instrument, TradeAction, TradingError},
};
use million_db::{
    AccountRepository, BudgetRepository, JournalError, OrderRepository, TradeRepository,
    UserRepository, connect_in_memory,
    entities::{accounts, holdings, orders, sea_orm_active_enums::{OrderEventType, OrderState}},
    repositories::{
        CreateAccountInput, DEFAULT_TRADING_ACCOUNT, NewBudgetEntry, NewOrder, NewTrade,
        TradeUpdate, UpsertHoldingInput,
    },
};
use million_shared::types::CurrencyCode;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

async fn setup() -> (DatabaseConnection, Uuid) {
    let db = connect_in_memory().await.expect("Failed to open test database");
    let user = UserRepository::new(db.clone())
        .create("journal-user", "$argon2id$test")
        .await
        .expect("Failed to create test user");
    (db, user.id)
}

fn trade(user_id: Uuid, action: TradeAction, quantity: i64, price: Decimal) -> NewTrade {
    NewTrade {
        user_id,
        symbol: "AAPL".to_string(),
        instrument: Instrument::Stock,
        strategy: Some("swing".to_string()),
        action,
        quantity,
        entry_price: price,
        entry_date: Utc::now(),
        option_type: None,
        strike_price: None,
        expiry_date: None,
        client_order_id: None,
    }
}

async fn trading_holding(db: &DatabaseConnection, user_id: Uuid) -> Option<holdings::Model> {
    let account = accounts::Entity::find()
        .filter(accounts::Column::UserId.eq(user_id))
        .filter(accounts::Column::Name.eq(DEFAULT_TRADING_ACCOUNT))
        .one(db)
        .await
        .unwrap()?;
    holdings::Entity::find()
        .filter(holdings::Column::AccountId.eq(account.id))
        .filter(holdings::Column::Symbol.eq("AAPL"))
        .one(db)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_trade_create_syncs_holdings_and_mirrors_order() {
    let (db, user_id) = setup().await;
    let repo = TradeRepository::new(db.clone());

    let (created, is_new) = repo
        .create(trade(user_id, TradeAction::Buy, 10, dec!(100)))
        .await
        .expect("Trade should be recorded");
    assert!(is_new);
    assert!(!created.is_closed);

    let holding = trading_holding(&db, user_id).await.expect("holding");
    assert_eq!(holding.quantity, dec!(10));
    assert_eq!(holding.avg_cost, Some(dec!(100)));

    let mirrored = orders::Entity::find()
        .filter(orders::Column::TradeId.eq(created.id))
        .one(&db)
        .await
        .unwrap()
        .expect("mirrored order");
    assert_eq!(mirrored.status, OrderState::Filled);
    assert_eq!(
        mirrored.client_order_id,
        Some(format!("trade:{}", created.id))
    );
}

#[tokio::test]
async fn test_trade_idempotent_on_client_order_id() {
    let (db, user_id) = setup().await;
    let repo = TradeRepository::new(db.clone());

    let mut input = trade(user_id, TradeAction::Buy, 5, dec!(50));
    input.client_order_id = Some("abc".to_string());

    let (first, first_new) = repo.create(input.clone()).await.unwrap();
    let (second, second_new) = repo.create(input).await.unwrap();

    assert!(first_new);
    assert!(!second_new);
    assert_eq!(first.id, second.id);
    assert_eq!(repo.list(user_id).await.unwrap().len(), 1);
    assert_eq!(
        trading_holding(&db, user_id).await.unwrap().quantity,
        dec!(5)
    );
}

#[tokio::test]
async fn test_close_books_pnl_and_flattens_holding() {
    let (db, user_id) = setup().await;
    let repo = TradeRepository::new(db.clone());
    let (opened, _) = repo
        .create(trade(user_id, TradeAction::Buy, 10, dec!(100)))
        .await
        .unwrap();

    let closed = repo
        .close(user_id, opened.id, dec!(110), None)
        .await
        .unwrap();
    assert!(closed.is_closed);
    assert_eq!(closed.realized_pnl, Some(dec!(100)));
    assert!(trading_holding(&db, user_id).await.is_none());

    let again = repo.close(user_id, opened.id, dec!(120), None).await;
    assert!(matches!(
        again,
        Err(JournalError::Trading(TradingError::AlreadyClosed))
    ));
}

#[tokio::test]
async fn test_short_trade_pnl() {
    let (db, user_id) = setup().await;
    let repo = TradeRepository::new(db.clone());
    let (opened, _) = repo
        .create(trade(user_id, TradeAction::Sell, 2, dec!(200)))
        .await
        .unwrap();
    assert_eq!(
        trading_holding(&db, user_id).await.unwrap().quantity,
        dec!(-2)
    );

    let closed = repo
        .close(user_id, opened.id, dec!(150), None)
        .await
        .unwrap();
    assert_eq!(closed.realized_pnl, Some(dec!(100)));
}

#[tokio::test]
async fn test_update_moves_holding_and_delete_reverses_it() {
    let (db, user_id) = setup().await;
    let repo = TradeRepository::new(db.clone());
    let (opened, _) = repo
        .create(trade(user_id, TradeAction::Buy, 10, dec!(100)))
        .await
        .unwrap();

    let updated = repo
        .update(
            user_id,
            opened.id,
            TradeUpdate {
                quantity: Some(4),
                ..TradeUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.quantity, 4);
    assert_eq!(
        trading_holding(&db, user_id).await.unwrap().quantity,
        dec!(4)
    );

    repo.delete(user_id, opened.id).await.unwrap();
    assert!(trading_holding(&db, user_id).await.is_none());
    assert!(repo.list(user_id).await.unwrap().is_empty());
    assert_eq!(orders::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_foreign_trade_is_not_found() {
    let (db, user_id) = setup().await;
    let repo = TradeRepository::new(db);
    let (opened, _) = repo
        .create(trade(user_id, TradeAction::Buy, 1, dec!(10)))
        .await
        .unwrap();

    let result = repo.delete(Uuid::new_v4(), opened.id).await;
    assert!(matches!(result, Err(JournalError::NotFound { .. })));
}

fn order(user_id: Uuid, limit_price: Option<Decimal>) -> NewOrder {
    NewOrder {
        user_id,
        symbol: "AAPL".to_string(),
        instrument: Instrument::Stock,
        action: TradeAction::Buy,
        strategy: None,
        quantity: 3,
        limit_price,
        client_order_id: Some("ord-1".to_string()),
    }
}

#[tokio::test]
async fn test_order_fill_creates_trade() {
    let (db, user_id) = setup().await;
    let repo = OrderRepository::new(db.clone());

    let (created, is_new) = repo.create(order(user_id, Some(dec!(20)))).await.unwrap();
    assert!(is_new);
    assert_eq!(created.status, OrderState::Pending);

    let (_, replay) = repo.create(order(user_id, Some(dec!(20)))).await.unwrap();
    assert!(!replay);

    let (filled, trade) = repo.fill(user_id, created.id, None, None).await.unwrap();
    assert_eq!(filled.status, OrderState::Filled);
    assert_eq!(filled.trade_id, Some(trade.id));
    assert_eq!(trade.entry_price, dec!(20));
    assert_eq!(trade.quantity, 3);
    assert_eq!(
        trading_holding(&db, user_id).await.unwrap().quantity,
        dec!(3)
    );

    let events: Vec<OrderEventType> = repo
        .events(user_id, created.id)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.event_type)
        .collect();
    assert_eq!(events, vec![OrderEventType::Created, OrderEventType::Filled]);

    let cancel = repo.cancel(user_id, created.id).await;
    assert!(matches!(
        cancel,
        Err(JournalError::Trading(TradingError::InvalidTransition { .. }))
    ));
}

#[tokio::test]
async fn test_order_cancel_and_market_fill_needs_price() {
    let (db, user_id) = setup().await;
    let repo = OrderRepository::new(db);

    let (market, _) = repo.create(order(user_id, None)).await.unwrap();
    let no_price = repo.fill(user_id, market.id, None, None).await;
    assert!(matches!(no_price, Err(JournalError::Validation(_))));

    let cancelled = repo.cancel(user_id, market.id).await.unwrap();
    assert_eq!(cancelled.status, OrderState::Cancelled);

    let events = repo.events(user_id, market.id).await.unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].event_type, OrderEventType::Cancelled);

    let refill = repo.fill(user_id, market.id, Some(dec!(5)), None).await;
    assert!(matches!(
        refill,
        Err(JournalError::Trading(TradingError::InvalidTransition { .. }))
    ));
}

#[tokio::test]
async fn test_accounts_and_holdings_ownership() {
    let (db, user_id) = setup().await;
    let repo = AccountRepository::new(db.clone());

    let account = repo
        .create(CreateAccountInput {
            user_id,
            name: "IRA".to_string(),
            broker: Some("Example Broker".to_string()),
            currency: CurrencyCode::default(),
        })
        .await
        .unwrap();

    let duplicate = repo
        .create(CreateAccountInput {
            user_id,
            name: "IRA".to_string(),
            broker: None,
            currency: CurrencyCode::default(),
        })
        .await;
    assert!(matches!(duplicate, Err(JournalError::Conflict(_))));

    let first = repo
        .upsert_holding(
            user_id,
            account.id,
            UpsertHoldingInput {
                symbol: "MSFT".to_string(),
                quantity: dec!(5),
                avg_cost: Some(dec!(300)),
            },
        )
        .await
        .unwrap();
    let second = repo
        .upsert_holding(
            user_id,
            account.id,
            UpsertHoldingInput {
                symbol: "MSFT".to_string(),
                quantity: dec!(8),
                avg_cost: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.quantity, dec!(8));

    let listed = repo.holdings(user_id, account.id).await.unwrap();
    assert_eq!(listed.len(), 1);

    let stranger = Uuid::new_v4();
    assert!(matches!(
        repo.holdings(stranger, account.id).await,
        Err(JournalError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_budget_entries_listed_newest_first() {
    let (db, user_id) = setup().await;
    let repo = BudgetRepository::new(db);

    for (day, category) in [(1, "Rent"), (15, "Groceries")] {
        repo.create(NewBudgetEntry {
            user_id,
            category: category.to_string(),
            kind: BudgetKind::Expense,
            amount: dec!(120.5),
            entry_date: NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
            description: None,
        })
        .await
        .unwrap();
    }

    let listed = repo.list(user_id).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].category, "Groceries");
    assert_eq!(listed[1].amount, dec!(120.5));
}
