//! Budget primitives and the period-membership rule.
//!
//! A `Budget` caps spending for one category. Its `spent` field is a cached
//! total: the sum of the user's expense transactions whose category matches
//! exactly (case-sensitive) and whose date falls in the current instance of
//! the budget's period.

use chrono::{DateTime, Datelike, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetPeriod {
    Monthly,
    Weekly,
    Yearly,
    Custom,
}

impl BudgetPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Weekly => "weekly",
            Self::Yearly => "yearly",
            Self::Custom => "custom",
        }
    }
}

impl TryFrom<&str> for BudgetPeriod {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "monthly" => Ok(Self::Monthly),
            "weekly" => Ok(Self::Weekly),
            "yearly" => Ok(Self::Yearly),
            "custom" => Ok(Self::Custom),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid budget period: {other}"
            ))),
        }
    }
}

/// Whether `date` falls in the current instance of a budget's period.
///
/// The window is anchored at the budget's `start_date`:
/// - monthly: same calendar year and month as `start_date`
/// - yearly: same calendar year as `start_date`
/// - weekly: same ISO week as `start_date`
/// - custom: `start_date <= date`, and `date <= end_date` when set
pub fn period_contains(
    period: BudgetPeriod,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
    date: DateTime<Utc>,
) -> bool {
    match period {
        BudgetPeriod::Monthly => {
            date.year() == start_date.year() && date.month() == start_date.month()
        }
        BudgetPeriod::Yearly => date.year() == start_date.year(),
        BudgetPeriod::Weekly => date.iso_week() == start_date.iso_week(),
        BudgetPeriod::Custom => {
            date >= start_date && end_date.is_none_or(|end| date <= end)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Budget {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    /// Matched against `Transaction.category` by exact string equality.
    pub category: String,
    pub amount: MoneyCents,
    /// Cached total of matching expense amounts; never negative.
    pub spent: MoneyCents,
    pub period: BudgetPeriod,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    /// Whether an expense with this category/date counts against the budget.
    pub fn matches(&self, category: &str, date: DateTime<Utc>) -> bool {
        self.is_active
            && self.category == category
            && period_contains(self.period, self.start_date, self.end_date, date)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub category: String,
    pub amount_minor: i64,
    pub spent_minor: i64,
    pub period: String,
    pub start_date: DateTimeUtc,
    pub end_date: Option<DateTimeUtc>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Budget> for ActiveModel {
    fn from(budget: &Budget) -> Self {
        Self {
            id: ActiveValue::Set(budget.id.to_string()),
            user_id: ActiveValue::Set(budget.user_id.to_string()),
            name: ActiveValue::Set(budget.name.clone()),
            category: ActiveValue::Set(budget.category.clone()),
            amount_minor: ActiveValue::Set(budget.amount.cents()),
            spent_minor: ActiveValue::Set(budget.spent.cents()),
            period: ActiveValue::Set(budget.period.as_str().to_string()),
            start_date: ActiveValue::Set(budget.start_date),
            end_date: ActiveValue::Set(budget.end_date),
            is_active: ActiveValue::Set(budget.is_active),
            created_at: ActiveValue::Set(budget.created_at),
            updated_at: ActiveValue::Set(budget.updated_at),
        }
    }
}

impl TryFrom<Model> for Budget {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("budget not exists".to_string()))?,
            user_id: Uuid::parse_str(&model.user_id)
                .map_err(|_| EngineError::KeyNotFound("user not exists".to_string()))?,
            name: model.name,
            category: model.category,
            amount: MoneyCents::new(model.amount_minor),
            spent: MoneyCents::new(model.spent_minor),
            period: BudgetPeriod::try_from(model.period.as_str())?,
            start_date: model.start_date,
            end_date: model.end_date,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).single().unwrap()
    }

    #[test]
    fn monthly_window_is_anchored_at_start_date() {
        let start = utc(2026, 3, 15);
        assert!(period_contains(BudgetPeriod::Monthly, start, None, utc(2026, 3, 1)));
        assert!(period_contains(BudgetPeriod::Monthly, start, None, utc(2026, 3, 31)));
        assert!(!period_contains(BudgetPeriod::Monthly, start, None, utc(2026, 4, 1)));
        assert!(!period_contains(BudgetPeriod::Monthly, start, None, utc(2025, 3, 15)));
    }

    #[test]
    fn yearly_window_matches_calendar_year() {
        let start = utc(2026, 6, 1);
        assert!(period_contains(BudgetPeriod::Yearly, start, None, utc(2026, 1, 1)));
        assert!(period_contains(BudgetPeriod::Yearly, start, None, utc(2026, 12, 31)));
        assert!(!period_contains(BudgetPeriod::Yearly, start, None, utc(2027, 1, 1)));
    }

    #[test]
    fn weekly_window_matches_iso_week() {
        // 2026-01-05 is a Monday.
        let start = utc(2026, 1, 5);
        assert!(period_contains(BudgetPeriod::Weekly, start, None, utc(2026, 1, 11)));
        assert!(!period_contains(BudgetPeriod::Weekly, start, None, utc(2026, 1, 12)));
        assert!(!period_contains(BudgetPeriod::Weekly, start, None, utc(2026, 1, 4)));
    }

    #[test]
    fn custom_window_uses_explicit_bounds() {
        let start = utc(2026, 2, 1);
        let end = utc(2026, 2, 20);
        assert!(period_contains(BudgetPeriod::Custom, start, Some(end), utc(2026, 2, 10)));
        assert!(!period_contains(BudgetPeriod::Custom, start, Some(end), utc(2026, 2, 21)));
        assert!(!period_contains(BudgetPeriod::Custom, start, Some(end), utc(2026, 1, 31)));
        // Open-ended when no end date is set.
        assert!(period_contains(BudgetPeriod::Custom, start, None, utc(2030, 1, 1)));
    }

    #[test]
    fn inactive_budgets_never_match() {
        let start = utc(2026, 3, 15);
        let budget = Budget {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Food".to_string(),
            category: "Food".to_string(),
            amount: MoneyCents::new(20_000),
            spent: MoneyCents::ZERO,
            period: BudgetPeriod::Monthly,
            start_date: start,
            end_date: None,
            is_active: false,
            created_at: start,
            updated_at: start,
        };
        assert!(!budget.matches("Food", start));
    }

    #[test]
    fn category_match_is_case_sensitive() {
        let start = utc(2026, 3, 15);
        let budget = Budget {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Food".to_string(),
            category: "Food".to_string(),
            amount: MoneyCents::new(20_000),
            spent: MoneyCents::ZERO,
            period: BudgetPeriod::Monthly,
            start_date: start,
            end_date: None,
            is_active: true,
            created_at: start,
            updated_at: start,
        };
        assert!(budget.matches("Food", start));
        assert!(!budget.matches("food", start));
    }
}
