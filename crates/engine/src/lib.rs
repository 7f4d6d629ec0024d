//! Domain layer of the finance tracker.
//!
//! The [`Engine`] owns the database connection and exposes every operation
//! the HTTP layer needs: user lifecycle, account/transaction/budget CRUD,
//! the reconciliation logic that keeps the cached `balance` and `spent`
//! totals consistent with the stored transaction set, and the read-side
//! statistics rollup.
//!
//! Every multi-write operation runs inside a single database transaction;
//! there is no partially-applied state to recover from.

pub use accounts::{Account, AccountKind};
pub use budgets::{Budget, BudgetPeriod, period_contains};
pub use commands::{
    CreateAccountCmd, CreateBudgetCmd, CreateTransactionCmd, UpdateAccountCmd, UpdateBudgetCmd,
    UpdateTransactionCmd,
};
pub use currency::CurrencyCode;
pub use error::EngineError;
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder, StatsOverview, TransactionListFilter};
pub use transactions::{Transaction, TransactionKind};
pub use users::User;

pub mod accounts;
pub mod budgets;
mod commands;
mod currency;
mod error;
mod money;
mod ops;
pub mod transactions;
pub mod users;

type ResultEngine<T> = Result<T, EngineError>;
