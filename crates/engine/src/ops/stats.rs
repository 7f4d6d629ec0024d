//! Read-side rollups, recomputed on every request. No state, no side
//! effects.

use chrono::{DateTime, Datelike, Months, TimeZone, Utc};
use sea_orm::{PaginatorTrait, QueryFilter, Statement, prelude::*};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, TransactionKind, accounts, budgets};

use super::Engine;

/// Per-user overview totals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatsOverview {
    pub total_accounts: u64,
    pub total_balance: MoneyCents,
    pub monthly_income: MoneyCents,
    pub monthly_expenses: MoneyCents,
    pub total_budgets: u64,
    pub exceeded_budgets: u64,
}

/// `[start, end)` of the calendar month containing `now`.
fn month_bounds(now: DateTime<Utc>) -> ResultEngine<(DateTime<Utc>, DateTime<Utc>)> {
    let invalid = || EngineError::InvalidAmount("invalid month window".to_string());
    let start = Utc
        .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .ok_or_else(invalid)?;
    let end = start.checked_add_months(Months::new(1)).ok_or_else(invalid)?;
    Ok((start, end))
}

impl Engine {
    async fn sum_transactions_in_window(
        &self,
        user_id: Uuid,
        kind: TransactionKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ResultEngine<MoneyCents> {
        let backend = self.database.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            "SELECT COALESCE(SUM(amount_minor), 0) AS sum \
             FROM transactions \
             WHERE user_id = ? AND kind = ? AND date >= ? AND date < ?",
            vec![
                user_id.to_string().into(),
                kind.as_str().into(),
                start.into(),
                end.into(),
            ],
        );
        let row = self.database.query_one(stmt).await?;
        let sum: i64 = row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0);
        Ok(MoneyCents::new(sum))
    }

    /// Overview totals for one user: account count and balance sum, this
    /// month's income/expense sums (transfers excluded), budget count and how
    /// many budgets are over their cap.
    pub async fn stats_overview(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> ResultEngine<StatsOverview> {
        let total_accounts = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id.to_string()))
            .count(&self.database)
            .await?;

        let total_balance: i64 = {
            let backend = self.database.get_database_backend();
            let stmt = Statement::from_sql_and_values(
                backend,
                "SELECT COALESCE(SUM(balance_minor), 0) AS sum FROM accounts WHERE user_id = ?",
                vec![user_id.to_string().into()],
            );
            let row = self.database.query_one(stmt).await?;
            row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0)
        };

        let (start, end) = month_bounds(now)?;
        let monthly_income = self
            .sum_transactions_in_window(user_id, TransactionKind::Income, start, end)
            .await?;
        let monthly_expenses = self
            .sum_transactions_in_window(user_id, TransactionKind::Expense, start, end)
            .await?;

        let budget_models = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id.to_string()))
            .all(&self.database)
            .await?;
        let total_budgets = budget_models.len() as u64;
        let exceeded_budgets = budget_models
            .iter()
            .filter(|b| b.spent_minor > b.amount_minor)
            .count() as u64;

        Ok(StatsOverview {
            total_accounts,
            total_balance: MoneyCents::new(total_balance),
            monthly_income,
            monthly_expenses,
            total_budgets,
            exceeded_budgets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_bounds_cover_the_calendar_month() {
        let now = Utc.with_ymd_and_hms(2026, 8, 6, 15, 30, 0).single().unwrap();
        let (start, end) = month_bounds(now).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).single().unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).single().unwrap());
    }

    #[test]
    fn month_bounds_roll_over_december() {
        let now = Utc.with_ymd_and_hms(2026, 12, 25, 0, 0, 0).single().unwrap();
        let (start, end) = month_bounds(now).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 12, 1, 0, 0, 0).single().unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).single().unwrap());
    }
}
