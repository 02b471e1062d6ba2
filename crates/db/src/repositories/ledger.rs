//! Ledger repository: cash postings and derived balances.
//!
//! An entry and its lines are written in one database transaction. Balances
//! are never stored; every read sums the lines.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use million_core::ledger::{
    AccountBalance, CASH_ACCOUNT_NAME, CLEARING_ACCOUNT_NAME, CashDirection, EntryKind,
    LedgerAccountKind, LedgerError, Side, plan_cash_posting, validate_amount,
};
use million_shared::types::{CurrencyCode, LedgerAccountId};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::{
    ledger_accounts, ledger_entries, ledger_lines,
    sea_orm_active_enums::{AccountKind, LedgerEntryType},
};

/// Maps persistence failures into the ledger taxonomy.
trait Persisted<T> {
    fn persisted(self) -> Result<T, LedgerError>;
}

impl<T> Persisted<T> for Result<T, DbErr> {
    fn persisted(self) -> Result<T, LedgerError> {
        self.map_err(|e| LedgerError::Database(e.to_string()))
    }
}

/// A cash movement to post.
#[derive(Debug, Clone)]
pub struct CashPosting {
    /// Owner.
    pub user_id: Uuid,
    /// Deposit or withdrawal.
    pub direction: CashDirection,
    /// Strictly positive amount.
    pub amount: Decimal,
    /// Requested currency. Defaults to the explicit account's currency, then USD.
    pub currency: Option<CurrencyCode>,
    /// Explicit cash ledger account; must be owned by the user.
    pub account_id: Option<Uuid>,
    /// Note stored on the entry and both lines.
    pub note: Option<String>,
    /// Effective time; defaults to now.
    pub effective_at: Option<DateTime<Utc>>,
    /// Replay protection key, unique per user.
    pub idempotency_key: Option<String>,
}

/// A written (or replayed) entry with its lines.
#[derive(Debug, Clone)]
pub struct PostedEntry {
    /// The entry.
    pub entry: ledger_entries::Model,
    /// Its lines.
    pub lines: Vec<ledger_lines::Model>,
    /// False when an existing entry was returned for a repeated idempotency key.
    pub created: bool,
}

/// A ledger account with its derived balance.
#[derive(Debug, Clone)]
pub struct AccountWithBalance {
    /// The account.
    pub account: ledger_accounts::Model,
    /// Debit/credit totals.
    pub balance: AccountBalance,
}

/// One entry line joined with its entry and account.
#[derive(Debug, Clone)]
pub struct EntryLineRow {
    /// Entry ID.
    pub entry_id: Uuid,
    /// Entry type.
    pub entry_type: EntryKind,
    /// Entry description.
    pub description: String,
    /// Entry effective time.
    pub effective_at: DateTime<Utc>,
    /// Entry creation time.
    pub created_at: DateTime<Utc>,
    /// Idempotency key, if any.
    pub idempotency_key: Option<String>,
    /// Line ID.
    pub line_id: Uuid,
    /// Account ID.
    pub account_id: Uuid,
    /// Account name.
    pub account_name: String,
    /// Account currency.
    pub currency: String,
    /// Debit or credit.
    pub side: Side,
    /// Line amount.
    pub amount: Decimal,
    /// Line memo.
    pub memo: Option<String>,
}

/// A cash movement read back from the ledger.
#[derive(Debug, Clone)]
pub struct CashMovement {
    /// Entry ID.
    pub entry_id: Uuid,
    /// Deposit or withdrawal.
    pub direction: CashDirection,
    /// Amount moved.
    pub amount: Decimal,
    /// Currency of the cash account.
    pub currency: String,
    /// Cash account touched.
    pub account_id: Uuid,
    /// Effective time.
    pub effective_at: DateTime<Utc>,
    /// Note, if any.
    pub note: Option<String>,
}

/// Ledger repository.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds or creates the user's account with this name and currency.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query or insert fails.
    pub async fn ensure_account<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        name: &str,
        kind: LedgerAccountKind,
        currency: &CurrencyCode,
    ) -> Result<ledger_accounts::Model, DbErr> {
        let existing = ledger_accounts::Entity::find()
            .filter(ledger_accounts::Column::UserId.eq(user_id))
            .filter(ledger_accounts::Column::Name.eq(name))
            .filter(ledger_accounts::Column::Currency.eq(currency.as_str()))
            .one(conn)
            .await?;

        if let Some(account) = existing {
            return Ok(account);
        }

        ledger_accounts::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(user_id),
            name: Set(name.to_string()),
            kind: Set(AccountKind::from(kind)),
            currency: Set(currency.as_str().to_string()),
            created_at: Set(Utc::now().into()),
        }
        .insert(conn)
        .await
    }

    /// Posts a deposit or withdrawal as one balanced entry.
    ///
    /// Overdrafts are allowed. A repeated idempotency key returns the earlier
    /// entry with `created: false`, including when two requests with the same
    /// key race and the second loses on the unique index.
    ///
    /// # Errors
    ///
    /// - `NonPositiveAmount` if `amount <= 0`
    /// - `AmountTooLarge` if `amount` is above `MAX_LINE_AMOUNT`
    /// - `AccountNotFound` if an explicit account is missing or not owned
    /// - `CurrencyMismatch` if an explicit account is in another currency
    /// - `Database` if the write fails; nothing is persisted
    pub async fn post_cash(&self, posting: CashPosting) -> Result<PostedEntry, LedgerError> {
        validate_amount(posting.amount)?;

        if let Some(key) = posting.idempotency_key.as_deref() {
            if let Some(existing) = find_by_key(&self.db, posting.user_id, key).await.persisted()? {
                info!(entry_id = %existing.entry.id, "Idempotent cash posting replayed");
                return Ok(existing);
            }
        }

        self.write_cash(posting).await
    }

    async fn write_cash(&self, posting: CashPosting) -> Result<PostedEntry, LedgerError> {
        let txn = self.db.begin().await.persisted()?;

        let (cash, currency) = match posting.account_id {
            Some(account_id) => {
                let account = ledger_accounts::Entity::find_by_id(account_id)
                    .filter(ledger_accounts::Column::UserId.eq(posting.user_id))
                    .one(&txn)
                    .await
                    .persisted()?
                    .ok_or(LedgerError::AccountNotFound(account_id))?;

                let currency = match posting.currency {
                    Some(requested) if requested.as_str() != account.currency => {
                        return Err(LedgerError::CurrencyMismatch {
                            account_id,
                            account_currency: account.currency,
                            requested: requested.as_str().to_string(),
                        });
                    }
                    Some(requested) => requested,
                    None => CurrencyCode::parse(&account.currency)
                        .map_err(LedgerError::InvalidCurrency)?,
                };
                (account, currency)
            }
            None => {
                let currency = posting.currency.unwrap_or_default();
                let account = Self::ensure_account(
                    &txn,
                    posting.user_id,
                    CASH_ACCOUNT_NAME,
                    LedgerAccountKind::Asset,
                    &currency,
                )
                .await
                .persisted()?;
                (account, currency)
            }
        };

        let clearing = Self::ensure_account(
            &txn,
            posting.user_id,
            CLEARING_ACCOUNT_NAME,
            LedgerAccountKind::Equity,
            &currency,
        )
        .await
        .persisted()?;

        let plan = plan_cash_posting(
            posting.direction,
            posting.amount,
            LedgerAccountId::from_uuid(cash.id),
            LedgerAccountId::from_uuid(clearing.id),
            posting.note.as_deref(),
        )?;

        let now = Utc::now();
        let inserted = ledger_entries::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(posting.user_id),
            entry_type: Set(LedgerEntryType::from(plan.kind)),
            description: Set(plan.description),
            effective_at: Set(posting.effective_at.unwrap_or(now).into()),
            idempotency_key: Set(posting.idempotency_key.clone()),
            source_type: Set(Some("cash".to_string())),
            source_id: Set(None),
            created_at: Set(now.into()),
        }
        .insert(&txn)
        .await;

        let entry = match (inserted, posting.idempotency_key.as_deref()) {
            (Ok(entry), _) => entry,
            (Err(err), Some(key))
                if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
            {
                txn.rollback().await.persisted()?;
                warn!(user_id = %posting.user_id, "Concurrent cash posting with the same key, replaying");
                return find_by_key(&self.db, posting.user_id, key)
                    .await
                    .persisted()?
                    .ok_or_else(|| LedgerError::Database(err.to_string()));
            }
            (Err(err), _) => return Err(LedgerError::Database(err.to_string())),
        };

        let mut lines = Vec::with_capacity(plan.lines.len());
        for line in plan.lines {
            let row = ledger_lines::ActiveModel {
                id: Set(Uuid::now_v7()),
                entry_id: Set(entry.id),
                account_id: Set(line.account_id.into_inner()),
                side: Set(line.side.into()),
                amount: Set(line.amount),
                memo: Set(line.memo),
                created_at: Set(now.into()),
            }
            .insert(&txn)
            .await
            .persisted()?;
            lines.push(row);
        }

        txn.commit().await.persisted()?;

        info!(
            entry_id = %entry.id,
            user_id = %posting.user_id,
            kind = ?plan.kind,
            amount = %posting.amount,
            currency = %currency,
            "Cash posted"
        );

        Ok(PostedEntry {
            entry,
            lines,
            created: true,
        })
    }

    /// Balance of one account: sum of debits minus sum of credits.
    ///
    /// # Errors
    ///
    /// Returns `Database` if the query fails and `Overflow` if a total
    /// leaves the decimal range.
    pub async fn account_balance(&self, account_id: Uuid) -> Result<AccountBalance, LedgerError> {
        let lines = ledger_lines::Entity::find()
            .filter(ledger_lines::Column::AccountId.eq(account_id))
            .all(&self.db)
            .await
            .persisted()?;

        AccountBalance::from_lines(lines.into_iter().map(|l| (Side::from(l.side), l.amount)))
    }

    /// Balance of the user's cash account in `currency`; zero if it was never
    /// provisioned.
    ///
    /// # Errors
    ///
    /// Same as [`Self::account_balance`].
    pub async fn cash_balance(
        &self,
        user_id: Uuid,
        currency: &CurrencyCode,
    ) -> Result<Decimal, LedgerError> {
        let account = ledger_accounts::Entity::find()
            .filter(ledger_accounts::Column::UserId.eq(user_id))
            .filter(ledger_accounts::Column::Name.eq(CASH_ACCOUNT_NAME))
            .filter(ledger_accounts::Column::Currency.eq(currency.as_str()))
            .one(&self.db)
            .await
            .persisted()?;

        match account {
            Some(account) => Ok(self.account_balance(account.id).await?.balance()),
            None => Ok(Decimal::ZERO),
        }
    }

    /// Every ledger account of the user with its balance.
    ///
    /// # Errors
    ///
    /// Same as [`Self::account_balance`].
    pub async fn balances(&self, user_id: Uuid) -> Result<Vec<AccountWithBalance>, LedgerError> {
        let accounts = ledger_accounts::Entity::find()
            .filter(ledger_accounts::Column::UserId.eq(user_id))
            .order_by_asc(ledger_accounts::Column::Currency)
            .order_by_asc(ledger_accounts::Column::Name)
            .all(&self.db)
            .await
            .persisted()?;

        let ids: Vec<Uuid> = accounts.iter().map(|a| a.id).collect();
        let lines = if ids.is_empty() {
            Vec::new()
        } else {
            ledger_lines::Entity::find()
                .filter(ledger_lines::Column::AccountId.is_in(ids))
                .all(&self.db)
                .await
                .persisted()?
        };

        let mut totals: HashMap<Uuid, AccountBalance> = HashMap::new();
        for line in lines {
            totals
                .entry(line.account_id)
                .or_default()
                .add(line.side.into(), line.amount)?;
        }

        Ok(accounts
            .into_iter()
            .map(|account| AccountWithBalance {
                balance: totals.get(&account.id).copied().unwrap_or_default(),
                account,
            })
            .collect())
    }

    /// Most recent entries (by effective time) flattened to one row per line.
    ///
    /// `limit` caps the number of entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_entries(&self, user_id: Uuid, limit: u64) -> Result<Vec<EntryLineRow>, DbErr> {
        let entries = self.recent_entries(user_id, limit).await?;
        let ids: Vec<Uuid> = entries.iter().map(|e| e.id).collect();
        let lines = lines_of(&self.db, &ids).await?;
        let accounts = self.account_map(user_id).await?;

        let mut by_entry: HashMap<Uuid, Vec<ledger_lines::Model>> = HashMap::new();
        for line in lines {
            by_entry.entry(line.entry_id).or_default().push(line);
        }

        let mut rows = Vec::new();
        for entry in entries {
            for line in by_entry.remove(&entry.id).unwrap_or_default() {
                let (account_name, currency) = accounts
                    .get(&line.account_id)
                    .map(|a| (a.name.clone(), a.currency.clone()))
                    .unwrap_or_default();
                rows.push(EntryLineRow {
                    entry_id: entry.id,
                    entry_type: entry.entry_type.into(),
                    description: entry.description.clone(),
                    effective_at: entry.effective_at.with_timezone(&Utc),
                    created_at: entry.created_at.with_timezone(&Utc),
                    idempotency_key: entry.idempotency_key.clone(),
                    line_id: line.id,
                    account_id: line.account_id,
                    account_name,
                    currency,
                    side: line.side.into(),
                    amount: line.amount,
                    memo: line.memo,
                });
            }
        }

        Ok(rows)
    }

    /// Cash movements derived from cash entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_cash(&self, user_id: Uuid, limit: u64) -> Result<Vec<CashMovement>, DbErr> {
        let entries = self.recent_entries(user_id, limit).await?;
        let ids: Vec<Uuid> = entries.iter().map(|e| e.id).collect();
        let lines = lines_of(&self.db, &ids).await?;
        let accounts = self.account_map(user_id).await?;

        let movements = entries
            .into_iter()
            .filter_map(|entry| {
                let direction = match EntryKind::from(entry.entry_type) {
                    EntryKind::CashDeposit => CashDirection::Deposit,
                    EntryKind::CashWithdraw => CashDirection::Withdraw,
                };
                let cash_side = direction.cash_side();
                let cash_line = lines
                    .iter()
                    .find(|l| l.entry_id == entry.id && Side::from(l.side) == cash_side)?;
                let currency = accounts
                    .get(&cash_line.account_id)
                    .map(|a| a.currency.clone())
                    .unwrap_or_default();

                Some(CashMovement {
                    entry_id: entry.id,
                    direction,
                    amount: cash_line.amount,
                    currency,
                    account_id: cash_line.account_id,
                    effective_at: entry.effective_at.with_timezone(&Utc),
                    note: cash_line.memo.clone(),
                })
            })
            .collect();

        Ok(movements)
    }

    async fn recent_entries(
        &self,
        user_id: Uuid,
        limit: u64,
    ) -> Result<Vec<ledger_entries::Model>, DbErr> {
        ledger_entries::Entity::find()
            .filter(ledger_entries::Column::UserId.eq(user_id))
            .order_by_desc(ledger_entries::Column::EffectiveAt)
            .order_by_desc(ledger_entries::Column::CreatedAt)
            .order_by_desc(ledger_entries::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
    }

    async fn account_map(&self, user_id: Uuid) -> Result<HashMap<Uuid, ledger_accounts::Model>, DbErr> {
        Ok(ledger_accounts::Entity::find()
            .filter(ledger_accounts::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect())
    }
}

async fn find_by_key<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    key: &str,
) -> Result<Option<PostedEntry>, DbErr> {
    let Some(entry) = ledger_entries::Entity::find()
        .filter(ledger_entries::Column::UserId.eq(user_id))
        .filter(ledger_entries::Column::IdempotencyKey.eq(key))
        .one(conn)
        .await?
    else {
        return Ok(None);
    };

    let lines = lines_of(conn, &[entry.id]).await?;
    Ok(Some(PostedEntry {
        entry,
        lines,
        created: false,
    }))
}

async fn lines_of<C: ConnectionTrait>(
    conn: &C,
    entry_ids: &[Uuid],
) -> Result<Vec<ledger_lines::Model>, DbErr> {
    if entry_ids.is_empty() {
        return Ok(Vec::new());
    }
    ledger_lines::Entity::find()
        .filter(ledger_lines::Column::EntryId.is_in(entry_ids.iter().copied()))
        .order_by_asc(ledger_lines::Column::CreatedAt)
        .order_by_asc(ledger_lines::Column::Id)
        .all(conn)
        .await
}
