//! Command structs for engine operations.
//!
//! These types group parameters for write operations (account, transaction
//! and budget create/update), keeping call sites readable and avoiding long
//! argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{AccountKind, BudgetPeriod, CurrencyCode, MoneyCents, TransactionKind};

/// Create an account.
#[derive(Clone, Debug)]
pub struct CreateAccountCmd {
    pub user_id: Uuid,
    pub name: String,
    pub kind: AccountKind,
    pub opening_balance: MoneyCents,
    pub currency: CurrencyCode,
    pub description: Option<String>,
    pub is_active: bool,
}

impl CreateAccountCmd {
    #[must_use]
    pub fn new(user_id: Uuid, name: impl Into<String>, kind: AccountKind) -> Self {
        Self {
            user_id,
            name: name.into(),
            kind,
            opening_balance: MoneyCents::ZERO,
            currency: CurrencyCode::default(),
            description: None,
            is_active: true,
        }
    }

    #[must_use]
    pub fn opening_balance(mut self, balance: MoneyCents) -> Self {
        self.opening_balance = balance;
        self
    }

    #[must_use]
    pub fn currency(mut self, currency: CurrencyCode) -> Self {
        self.currency = currency;
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn is_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
}

/// Update an account. `None` fields are left unchanged; the balance is not
/// updatable, it only moves through transaction writes.
#[derive(Clone, Debug)]
pub struct UpdateAccountCmd {
    pub account_id: Uuid,
    pub user_id: Uuid,
    pub name: Option<String>,
    pub kind: Option<AccountKind>,
    pub currency: Option<CurrencyCode>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl UpdateAccountCmd {
    #[must_use]
    pub fn new(account_id: Uuid, user_id: Uuid) -> Self {
        Self {
            account_id,
            user_id,
            name: None,
            kind: None,
            currency: None,
            description: None,
            is_active: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: AccountKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn currency(mut self, currency: CurrencyCode) -> Self {
        self.currency = Some(currency);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn is_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }
}

/// Create a transaction.
#[derive(Clone, Debug)]
pub struct CreateTransactionCmd {
    pub user_id: Uuid,
    pub account_id: Uuid,
    /// Must be > 0. The kind defines the sign of the balance delta.
    pub amount: MoneyCents,
    pub kind: TransactionKind,
    pub category: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub tags: Vec<String>,
    /// Required for transfers; must differ from `account_id`.
    pub transfer_account_id: Option<Uuid>,
}

impl CreateTransactionCmd {
    #[must_use]
    pub fn new(
        user_id: Uuid,
        account_id: Uuid,
        amount: MoneyCents,
        kind: TransactionKind,
        category: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            account_id,
            amount,
            kind,
            category: category.into(),
            description: None,
            date,
            tags: Vec::new(),
            transfer_account_id: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    #[must_use]
    pub fn transfer_account_id(mut self, account_id: Uuid) -> Self {
        self.transfer_account_id = Some(account_id);
        self
    }
}

/// Update an existing transaction. `None` fields are left unchanged.
#[derive(Clone, Debug)]
pub struct UpdateTransactionCmd {
    pub transaction_id: Uuid,
    pub user_id: Uuid,
    pub account_id: Option<Uuid>,
    pub amount: Option<MoneyCents>,
    pub kind: Option<TransactionKind>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub tags: Option<Vec<String>>,
    pub transfer_account_id: Option<Uuid>,
}

impl UpdateTransactionCmd {
    #[must_use]
    pub fn new(transaction_id: Uuid, user_id: Uuid) -> Self {
        Self {
            transaction_id,
            user_id,
            account_id: None,
            amount: None,
            kind: None,
            category: None,
            description: None,
            date: None,
            tags: None,
            transfer_account_id: None,
        }
    }

    #[must_use]
    pub fn account_id(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: MoneyCents) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    #[must_use]
    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    #[must_use]
    pub fn transfer_account_id(mut self, account_id: Uuid) -> Self {
        self.transfer_account_id = Some(account_id);
        self
    }
}

/// Create a budget.
#[derive(Clone, Debug)]
pub struct CreateBudgetCmd {
    pub user_id: Uuid,
    /// Display name; defaults to the category when `None`.
    pub name: Option<String>,
    pub category: String,
    pub amount: MoneyCents,
    pub period: BudgetPeriod,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl CreateBudgetCmd {
    #[must_use]
    pub fn new(
        user_id: Uuid,
        category: impl Into<String>,
        amount: MoneyCents,
        period: BudgetPeriod,
        start_date: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            name: None,
            category: category.into(),
            amount,
            period,
            start_date,
            end_date: None,
            is_active: true,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn end_date(mut self, end_date: DateTime<Utc>) -> Self {
        self.end_date = Some(end_date);
        self
    }

    #[must_use]
    pub fn is_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
}

/// Update a budget. `None` fields are left unchanged. Changing any field that
/// affects matching (category, period, dates, active flag) triggers a
/// recompute of the cached spent total.
#[derive(Clone, Debug)]
pub struct UpdateBudgetCmd {
    pub budget_id: Uuid,
    pub user_id: Uuid,
    pub name: Option<String>,
    pub category: Option<String>,
    pub amount: Option<MoneyCents>,
    pub period: Option<BudgetPeriod>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

impl UpdateBudgetCmd {
    #[must_use]
    pub fn new(budget_id: Uuid, user_id: Uuid) -> Self {
        Self {
            budget_id,
            user_id,
            name: None,
            category: None,
            amount: None,
            period: None,
            start_date: None,
            end_date: None,
            is_active: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: MoneyCents) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn period(mut self, period: BudgetPeriod) -> Self {
        self.period = Some(period);
        self
    }

    #[must_use]
    pub fn start_date(mut self, start_date: DateTime<Utc>) -> Self {
        self.start_date = Some(start_date);
        self
    }

    #[must_use]
    pub fn end_date(mut self, end_date: DateTime<Utc>) -> Self {
        self.end_date = Some(end_date);
        self
    }

    #[must_use]
    pub fn is_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }
}
