use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Response envelope shared by every endpoint.
///
/// `data` carries the payload on success, `message` carries a human-readable
/// note (validation violations, "deleted", error detail). Absent fields are
/// omitted from the JSON.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }
}

impl ApiResponse<()> {
    /// A success response with no payload, only a note.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

pub mod user {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub name: String,
        pub email: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProfileUpdate {
        pub name: Option<String>,
        pub email: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PasswordChange {
        pub current_password: String,
        pub new_password: String,
    }
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Register {
        pub name: String,
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Login {
        pub email: String,
        pub password: String,
    }

    /// Payload of `/auth/register` and `/auth/login`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuthData {
        pub user: user::UserView,
        pub token: String,
    }
}

pub mod account {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AccountKind {
        Checking,
        Savings,
        Credit,
        Investment,
        Cash,
        Other,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub name: String,
        pub kind: AccountKind,
        /// Opening balance; defaults to 0.
        pub balance_minor: Option<i64>,
        /// Three-letter uppercase code; defaults to `USD`.
        pub currency: Option<String>,
        pub description: Option<String>,
        pub is_active: Option<bool>,
    }

    /// Partial update; `balance_minor` is intentionally absent. Balances only
    /// move through transaction writes.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AccountUpdate {
        pub name: Option<String>,
        pub kind: Option<AccountKind>,
        pub currency: Option<String>,
        pub description: Option<String>,
        pub is_active: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: Uuid,
        pub name: String,
        pub kind: AccountKind,
        pub balance_minor: i64,
        pub currency: String,
        pub description: Option<String>,
        pub is_active: bool,
        /// RFC3339 timestamp, including timezone offset.
        pub created_at: DateTime<FixedOffset>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Income,
        Expense,
        Transfer,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub account_id: Uuid,
        /// Must be > 0. The kind defines the sign of the balance delta.
        pub amount_minor: i64,
        pub kind: TransactionKind,
        pub category: String,
        pub description: Option<String>,
        /// RFC3339 timestamp; defaults to now.
        pub date: Option<DateTime<FixedOffset>>,
        pub tags: Option<Vec<String>>,
        /// Required when kind is `transfer`; must differ from `account_id`.
        pub transfer_account_id: Option<Uuid>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub account_id: Option<Uuid>,
        pub amount_minor: Option<i64>,
        pub kind: Option<TransactionKind>,
        pub category: Option<String>,
        pub description: Option<String>,
        pub date: Option<DateTime<FixedOffset>>,
        pub tags: Option<Vec<String>>,
        pub transfer_account_id: Option<Uuid>,
    }

    /// Query string filters for `GET /transactions`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionListQuery {
        pub account_id: Option<Uuid>,
        pub category: Option<String>,
        pub kind: Option<TransactionKind>,
        /// Inclusive lower bound on the transaction date.
        pub from: Option<DateTime<FixedOffset>>,
        /// Inclusive upper bound on the transaction date.
        pub to: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub account_id: Uuid,
        pub amount_minor: i64,
        pub kind: TransactionKind,
        pub category: String,
        pub description: Option<String>,
        pub date: DateTime<FixedOffset>,
        pub tags: Vec<String>,
        pub transfer_account_id: Option<Uuid>,
    }
}

pub mod budget {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum BudgetPeriod {
        Monthly,
        Weekly,
        Yearly,
        Custom,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetNew {
        /// Display name; defaults to the category.
        pub name: Option<String>,
        pub category: String,
        /// Spending cap, must be >= 0.
        pub amount_minor: i64,
        pub period: BudgetPeriod,
        /// Anchor of the budget's recurring window; defaults to now.
        pub start_date: Option<DateTime<FixedOffset>>,
        pub end_date: Option<DateTime<FixedOffset>>,
        pub is_active: Option<bool>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BudgetUpdate {
        pub name: Option<String>,
        pub category: Option<String>,
        pub amount_minor: Option<i64>,
        pub period: Option<BudgetPeriod>,
        pub start_date: Option<DateTime<FixedOffset>>,
        pub end_date: Option<DateTime<FixedOffset>>,
        pub is_active: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetView {
        pub id: Uuid,
        pub name: String,
        pub category: String,
        pub amount_minor: i64,
        pub spent_minor: i64,
        pub period: BudgetPeriod,
        pub start_date: DateTime<FixedOffset>,
        pub end_date: Option<DateTime<FixedOffset>>,
        pub is_active: bool,
    }
}

pub mod stats {
    use super::*;

    /// Read-side rollup for `GET /stats/overview`, recomputed per request.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatsOverview {
        pub total_accounts: u64,
        pub total_balance_minor: i64,
        pub monthly_income_minor: i64,
        pub monthly_expenses_minor: i64,
        pub total_budgets: u64,
        pub exceeded_budgets: u64,
    }
}
