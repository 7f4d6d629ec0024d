//! Budget operations.
//!
//! At most one budget exists per (user, category); creation rejects
//! duplicates. The cached `spent` total is seeded at creation, adjusted
//! incrementally by transaction writes, and can be rebuilt from scratch with
//! [`Engine::recompute_budget_spent`].

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Budget, BudgetPeriod, CreateBudgetCmd, EngineError, MoneyCents, ResultEngine,
    TransactionKind, UpdateBudgetCmd, budgets, period_contains, transactions,
};

use super::{Engine, normalize_optional_text, normalize_required_text, with_tx};

impl Engine {
    /// Sum the user's expense transactions in `category` whose date falls in
    /// the current instance of the given period.
    async fn compute_spent<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
        category: &str,
        period: BudgetPeriod,
        start_date: DateTime<Utc>,
        end_date: Option<DateTime<Utc>>,
    ) -> ResultEngine<MoneyCents> {
        let models = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id.to_string()))
            .filter(transactions::Column::Category.eq(category.to_string()))
            .filter(transactions::Column::Kind.eq(TransactionKind::Expense.as_str()))
            .all(db)
            .await?;

        let mut total = MoneyCents::ZERO;
        for model in models {
            if period_contains(period, start_date, end_date, model.date) {
                total = total
                    .checked_add(MoneyCents::new(model.amount_minor))
                    .ok_or_else(|| EngineError::InvalidAmount("spent overflow".to_string()))?;
            }
        }
        Ok(total)
    }

    /// Create a budget. The spent total is seeded from already-stored
    /// expenses, so a budget created mid-period immediately reflects them.
    pub async fn create_budget(&self, cmd: CreateBudgetCmd) -> ResultEngine<Budget> {
        let category = normalize_required_text(&cmd.category, "category")?;
        if cmd.amount.is_negative() {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be >= 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let exists = budgets::Entity::find()
                .filter(budgets::Column::UserId.eq(cmd.user_id.to_string()))
                .filter(budgets::Column::Category.eq(category.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(category));
            }

            let spent = self
                .compute_spent(
                    &db_tx,
                    cmd.user_id,
                    &category,
                    cmd.period,
                    cmd.start_date,
                    cmd.end_date,
                )
                .await?;

            let now = Utc::now();
            let budget = Budget {
                id: Uuid::new_v4(),
                user_id: cmd.user_id,
                name: normalize_optional_text(cmd.name.as_deref())
                    .unwrap_or_else(|| category.clone()),
                category,
                amount: cmd.amount,
                spent,
                period: cmd.period,
                start_date: cmd.start_date,
                end_date: cmd.end_date,
                is_active: cmd.is_active,
                created_at: now,
                updated_at: now,
            };
            budgets::ActiveModel::from(&budget).insert(&db_tx).await?;
            Ok(budget)
        })
    }

    /// Return a single budget.
    pub async fn budget(&self, budget_id: Uuid, user_id: Uuid) -> ResultEngine<Budget> {
        let model = self
            .require_budget(&self.database, budget_id, user_id)
            .await?;
        Budget::try_from(model)
    }

    /// List the user's budgets, newest first.
    pub async fn budgets(&self, user_id: Uuid) -> ResultEngine<Vec<Budget>> {
        let models = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id.to_string()))
            .order_by_desc(budgets::Column::CreatedAt)
            .all(&self.database)
            .await?;
        models.into_iter().map(Budget::try_from).collect()
    }

    /// Update a budget. When any field that affects matching changes
    /// (category, period, dates, active flag) the spent total is recomputed
    /// in the same DB transaction.
    pub async fn update_budget(&self, cmd: UpdateBudgetCmd) -> ResultEngine<Budget> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_budget(&db_tx, cmd.budget_id, cmd.user_id)
                .await?;
            let mut budget = Budget::try_from(model)?;

            let mut matching_changed = false;

            if let Some(category) = cmd.category.as_deref() {
                let category = normalize_required_text(category, "category")?;
                if category != budget.category {
                    let taken = budgets::Entity::find()
                        .filter(budgets::Column::UserId.eq(cmd.user_id.to_string()))
                        .filter(budgets::Column::Category.eq(category.clone()))
                        .filter(budgets::Column::Id.ne(budget.id.to_string()))
                        .one(&db_tx)
                        .await?
                        .is_some();
                    if taken {
                        return Err(EngineError::ExistingKey(category));
                    }
                    budget.category = category;
                    matching_changed = true;
                }
            }
            if let Some(name) = cmd.name.as_deref() {
                budget.name = normalize_required_text(name, "name")?;
            }
            if let Some(amount) = cmd.amount {
                if amount.is_negative() {
                    return Err(EngineError::InvalidAmount(
                        "amount_minor must be >= 0".to_string(),
                    ));
                }
                budget.amount = amount;
            }
            if let Some(period) = cmd.period {
                matching_changed |= period != budget.period;
                budget.period = period;
            }
            if let Some(start_date) = cmd.start_date {
                matching_changed |= start_date != budget.start_date;
                budget.start_date = start_date;
            }
            if let Some(end_date) = cmd.end_date {
                matching_changed |= Some(end_date) != budget.end_date;
                budget.end_date = Some(end_date);
            }
            if let Some(is_active) = cmd.is_active {
                matching_changed |= is_active != budget.is_active;
                budget.is_active = is_active;
            }

            if matching_changed {
                budget.spent = self
                    .compute_spent(
                        &db_tx,
                        cmd.user_id,
                        &budget.category,
                        budget.period,
                        budget.start_date,
                        budget.end_date,
                    )
                    .await?;
            }
            budget.updated_at = Utc::now();

            budgets::ActiveModel::from(&budget).update(&db_tx).await?;
            Ok(budget)
        })
    }

    /// Delete a budget.
    pub async fn delete_budget(&self, budget_id: Uuid, user_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_budget(&db_tx, budget_id, user_id).await?;
            budgets::Entity::delete_by_id(budget_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Rebuild the cached spent total from the transaction set.
    ///
    /// The window honors the budget's own period (anchored at its start
    /// date), so a recompute never disagrees with the incremental updates.
    /// Idempotent: repeated calls without intervening writes return the same
    /// value.
    pub async fn recompute_budget_spent(
        &self,
        budget_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<Budget> {
        with_tx!(self, |db_tx| {
            let model = self.require_budget(&db_tx, budget_id, user_id).await?;
            let mut budget = Budget::try_from(model)?;

            budget.spent = self
                .compute_spent(
                    &db_tx,
                    user_id,
                    &budget.category,
                    budget.period,
                    budget.start_date,
                    budget.end_date,
                )
                .await?;
            budget.updated_at = Utc::now();

            let update = budgets::ActiveModel {
                id: ActiveValue::Set(budget.id.to_string()),
                spent_minor: ActiveValue::Set(budget.spent.cents()),
                updated_at: ActiveValue::Set(budget.updated_at),
                ..Default::default()
            };
            update.update(&db_tx).await?;
            Ok(budget)
        })
    }
}
