//! Transaction write and read operations.
//!
//! Every write keeps two cached totals consistent with the stored transaction
//! set, inside a single DB transaction:
//!
//! - the referenced account's `balance` (both accounts for transfers), and
//! - the `spent` total of every budget matching an expense.
//!
//! Updates follow the undo-then-redo pattern: reverse the old effect, apply
//! the field changes, apply the new effect. That nets correctly even when the
//! update moves the transaction to another account or category.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Budget, CreateTransactionCmd, EngineError, MoneyCents, ResultEngine, Transaction,
    TransactionKind, UpdateTransactionCmd, accounts, budgets, transactions,
};

use super::{Engine, normalize_optional_text, normalize_required_text, with_tx};

/// Filters for transaction listing. All bounds are inclusive.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub account_id: Option<Uuid>,
    pub category: Option<String>,
    pub kind: Option<TransactionKind>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// The signed balance deltas a transaction applies, one entry per account.
fn balance_deltas(tx: &Transaction) -> ResultEngine<Vec<(Uuid, MoneyCents)>> {
    match tx.kind {
        TransactionKind::Income => Ok(vec![(tx.account_id, tx.amount)]),
        TransactionKind::Expense => Ok(vec![(tx.account_id, -tx.amount)]),
        TransactionKind::Transfer => {
            let target = tx.transfer_account_id.ok_or_else(|| {
                EngineError::InvalidTransfer("transfer without a target account".to_string())
            })?;
            // Both legs move together; total balance across accounts is unchanged.
            Ok(vec![(tx.account_id, -tx.amount), (target, tx.amount)])
        }
    }
}

impl Engine {
    /// Add `delta` to an account's cached balance.
    pub(super) async fn apply_account_delta<C: ConnectionTrait>(
        &self,
        db: &C,
        account_id: Uuid,
        user_id: Uuid,
        delta: MoneyCents,
    ) -> ResultEngine<()> {
        let model = self.require_account(db, account_id, user_id).await?;
        let new_balance = MoneyCents::new(model.balance_minor)
            .checked_add(delta)
            .ok_or_else(|| EngineError::InvalidAmount("balance overflow".to_string()))?;

        let update = accounts::ActiveModel {
            id: ActiveValue::Set(model.id),
            balance_minor: ActiveValue::Set(new_balance.cents()),
            updated_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        update.update(db).await?;
        Ok(())
    }

    /// Add `delta` to the spent total of every budget matching an expense with
    /// this category/date. Zero matching budgets is a no-op, not an error.
    /// The result is floored at zero.
    pub(super) async fn adjust_budget_spent<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
        category: &str,
        date: DateTime<Utc>,
        delta: MoneyCents,
    ) -> ResultEngine<()> {
        let models = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id.to_string()))
            .filter(budgets::Column::Category.eq(category.to_string()))
            .filter(budgets::Column::IsActive.eq(true))
            .all(db)
            .await?;

        for model in models {
            let budget = Budget::try_from(model)?;
            if !budget.matches(category, date) {
                continue;
            }
            let new_spent = budget
                .spent
                .checked_add(delta)
                .ok_or_else(|| EngineError::InvalidAmount("spent overflow".to_string()))?
                .max(MoneyCents::ZERO);

            let update = budgets::ActiveModel {
                id: ActiveValue::Set(budget.id.to_string()),
                spent_minor: ActiveValue::Set(new_spent.cents()),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            update.update(db).await?;
        }
        Ok(())
    }

    /// Apply a transaction's full effect: balance deltas plus, for expenses,
    /// the budget spent adjustment. `sign` is `1` to apply and `-1` to undo.
    pub(super) async fn apply_transaction_effect<C: ConnectionTrait>(
        &self,
        db: &C,
        tx: &Transaction,
        sign: i64,
    ) -> ResultEngine<()> {
        for (account_id, delta) in balance_deltas(tx)? {
            let delta = if sign < 0 { -delta } else { delta };
            self.apply_account_delta(db, account_id, tx.user_id, delta)
                .await?;
        }
        if tx.kind == TransactionKind::Expense {
            let delta = if sign < 0 { -tx.amount } else { tx.amount };
            self.adjust_budget_spent(db, tx.user_id, &tx.category, tx.date, delta)
                .await?;
        }
        Ok(())
    }

    /// Validate the accounts a transaction references: the source must exist
    /// and belong to the caller; transfers additionally need a distinct,
    /// owned target.
    async fn require_transaction_accounts<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
        account_id: Uuid,
        kind: TransactionKind,
        transfer_account_id: Option<Uuid>,
    ) -> ResultEngine<()> {
        self.require_account(db, account_id, user_id).await?;
        if kind == TransactionKind::Transfer {
            let target = transfer_account_id.ok_or_else(|| {
                EngineError::InvalidTransfer(
                    "transfer_account_id is required for transfers".to_string(),
                )
            })?;
            if target == account_id {
                return Err(EngineError::InvalidTransfer(
                    "transfer_account_id must differ from account_id".to_string(),
                ));
            }
            self.require_account(db, target, user_id).await?;
        }
        Ok(())
    }

    /// Create a transaction and reconcile balances/budgets atomically.
    pub async fn create_transaction(&self, cmd: CreateTransactionCmd) -> ResultEngine<Transaction> {
        let category = normalize_required_text(&cmd.category, "category")?;
        let transfer_account_id = match cmd.kind {
            TransactionKind::Transfer => cmd.transfer_account_id,
            _ => None,
        };

        with_tx!(self, |db_tx| {
            self.require_transaction_accounts(
                &db_tx,
                cmd.user_id,
                cmd.account_id,
                cmd.kind,
                transfer_account_id,
            )
            .await?;

            let tx = Transaction::new(
                cmd.user_id,
                cmd.account_id,
                cmd.amount,
                cmd.kind,
                category,
                normalize_optional_text(cmd.description.as_deref()),
                cmd.date,
                cmd.tags,
                transfer_account_id,
                Utc::now(),
            )?;
            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;

            self.apply_transaction_effect(&db_tx, &tx, 1).await?;
            Ok(tx)
        })
    }

    /// Update a transaction: undo the old effect, apply the field changes and
    /// redo the new effect in one DB transaction.
    pub async fn update_transaction(&self, cmd: UpdateTransactionCmd) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_transaction(&db_tx, cmd.transaction_id, cmd.user_id)
                .await?;
            let old = Transaction::try_from(model)?;

            self.apply_transaction_effect(&db_tx, &old, -1).await?;

            let kind = cmd.kind.unwrap_or(old.kind);
            let amount = cmd.amount.unwrap_or(old.amount);
            if !amount.is_positive() {
                return Err(EngineError::InvalidAmount(
                    "amount_minor must be > 0".to_string(),
                ));
            }
            let account_id = cmd.account_id.unwrap_or(old.account_id);
            let transfer_account_id = match kind {
                TransactionKind::Transfer => cmd.transfer_account_id.or(old.transfer_account_id),
                _ => None,
            };
            self.require_transaction_accounts(
                &db_tx,
                cmd.user_id,
                account_id,
                kind,
                transfer_account_id,
            )
            .await?;

            let category = match cmd.category.as_deref() {
                Some(category) => normalize_required_text(category, "category")?,
                None => old.category.clone(),
            };
            let description = match cmd.description.as_deref() {
                Some(description) => normalize_optional_text(Some(description)),
                None => old.description.clone(),
            };

            let updated = Transaction {
                id: old.id,
                user_id: old.user_id,
                account_id,
                amount,
                kind,
                category,
                description,
                date: cmd.date.unwrap_or(old.date),
                tags: cmd.tags.unwrap_or_else(|| old.tags.clone()),
                transfer_account_id,
                created_at: old.created_at,
                updated_at: Utc::now(),
            };
            transactions::ActiveModel::from(&updated)
                .update(&db_tx)
                .await?;

            self.apply_transaction_effect(&db_tx, &updated, 1).await?;
            Ok(updated)
        })
    }

    /// Delete a transaction and reverse its effect atomically.
    pub async fn delete_transaction(
        &self,
        transaction_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_transaction(&db_tx, transaction_id, user_id)
                .await?;
            let tx = Transaction::try_from(model)?;

            transactions::Entity::delete_by_id(transaction_id.to_string())
                .exec(&db_tx)
                .await?;

            self.apply_transaction_effect(&db_tx, &tx, -1).await?;
            Ok(())
        })
    }

    /// Return a single transaction.
    pub async fn transaction(
        &self,
        transaction_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<Transaction> {
        let model = self
            .require_transaction(&self.database, transaction_id, user_id)
            .await?;
        Transaction::try_from(model)
    }

    /// List the user's transactions, newest first.
    pub async fn transactions(
        &self,
        user_id: Uuid,
        filter: &TransactionListFilter,
    ) -> ResultEngine<Vec<Transaction>> {
        let mut query = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id.to_string()))
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::CreatedAt);

        if let Some(account_id) = filter.account_id {
            query = query.filter(transactions::Column::AccountId.eq(account_id.to_string()));
        }
        if let Some(category) = filter.category.as_deref() {
            query = query.filter(transactions::Column::Category.eq(category.to_string()));
        }
        if let Some(kind) = filter.kind {
            query = query.filter(transactions::Column::Kind.eq(kind.as_str()));
        }
        if let Some(from) = filter.from {
            query = query.filter(transactions::Column::Date.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(transactions::Column::Date.lte(to));
        }

        let models = query.all(&self.database).await?;
        models.into_iter().map(Transaction::try_from).collect()
    }
}
