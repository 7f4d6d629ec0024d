//! Account operations.

use chrono::Utc;
use sea_orm::{Condition, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Account, CreateAccountCmd, ResultEngine, Transaction, TransactionKind, UpdateAccountCmd,
    accounts, transactions,
};

use super::{Engine, normalize_optional_text, normalize_required_text, with_tx};

impl Engine {
    /// Create an account with an opening balance.
    pub async fn new_account(&self, cmd: CreateAccountCmd) -> ResultEngine<Account> {
        let name = normalize_required_text(&cmd.name, "account name")?;
        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            user_id: cmd.user_id,
            name,
            kind: cmd.kind,
            balance: cmd.opening_balance,
            currency: cmd.currency,
            description: normalize_optional_text(cmd.description.as_deref()),
            is_active: cmd.is_active,
            created_at: now,
            updated_at: now,
        };
        accounts::ActiveModel::from(&account)
            .insert(&self.database)
            .await?;
        Ok(account)
    }

    /// Return a single account.
    pub async fn account(&self, account_id: Uuid, user_id: Uuid) -> ResultEngine<Account> {
        let model = self
            .require_account(&self.database, account_id, user_id)
            .await?;
        Account::try_from(model)
    }

    /// List the user's accounts, newest first.
    pub async fn accounts(&self, user_id: Uuid) -> ResultEngine<Vec<Account>> {
        let models = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id.to_string()))
            .order_by_desc(accounts::Column::CreatedAt)
            .all(&self.database)
            .await?;
        models.into_iter().map(Account::try_from).collect()
    }

    /// Update account metadata. The balance is not touched here: it only
    /// moves through transaction writes.
    pub async fn update_account(&self, cmd: UpdateAccountCmd) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_account(&db_tx, cmd.account_id, cmd.user_id)
                .await?;
            let mut account = Account::try_from(model)?;

            if let Some(name) = cmd.name.as_deref() {
                account.name = normalize_required_text(name, "account name")?;
            }
            if let Some(kind) = cmd.kind {
                account.kind = kind;
            }
            if let Some(currency) = cmd.currency {
                account.currency = currency;
            }
            if let Some(description) = cmd.description.as_deref() {
                account.description = normalize_optional_text(Some(description));
            }
            if let Some(is_active) = cmd.is_active {
                account.is_active = is_active;
            }
            account.updated_at = Utc::now();

            accounts::ActiveModel::from(&account).update(&db_tx).await?;
            Ok(account)
        })
    }

    /// Delete an account together with every transaction touching it, in one
    /// DB transaction.
    ///
    /// Transactions referencing the account from the other side (transfers in
    /// or out of surviving accounts) are deleted too, and their effect on the
    /// surviving account and on budget spent totals is reversed, so the
    /// remaining cached totals stay consistent with the remaining rows.
    pub async fn delete_account(&self, account_id: Uuid, user_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, account_id, user_id).await?;

            let id = account_id.to_string();
            let touching = transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id.to_string()))
                .filter(
                    Condition::any()
                        .add(transactions::Column::AccountId.eq(id.clone()))
                        .add(transactions::Column::TransferAccountId.eq(id.clone())),
                )
                .all(&db_tx)
                .await?;

            for model in touching {
                let tx = Transaction::try_from(model)?;

                // Reverse the leg that lands on a surviving account.
                if tx.kind == TransactionKind::Transfer {
                    if tx.account_id == account_id {
                        if let Some(target) = tx.transfer_account_id {
                            self.apply_account_delta(&db_tx, target, user_id, -tx.amount)
                                .await?;
                        }
                    } else {
                        self.apply_account_delta(&db_tx, tx.account_id, user_id, tx.amount)
                            .await?;
                    }
                }
                if tx.kind == TransactionKind::Expense {
                    self.adjust_budget_spent(&db_tx, user_id, &tx.category, tx.date, -tx.amount)
                        .await?;
                }

                transactions::Entity::delete_by_id(tx.id.to_string())
                    .exec(&db_tx)
                    .await?;
            }

            accounts::Entity::delete_by_id(id).exec(&db_tx).await?;
            Ok(())
        })
    }
}
