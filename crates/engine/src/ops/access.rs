//! Ownership-scoped row lookups.
//!
//! Every helper filters by the caller's `user_id` as well as the row id:
//! a row that exists but belongs to someone else is reported as absent, so
//! callers cannot probe other tenants' data.

use sea_orm::{ConnectionTrait, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, accounts, budgets, transactions, users};

use super::Engine;

impl Engine {
    pub(crate) async fn require_user<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    pub(crate) async fn require_account<C: ConnectionTrait>(
        &self,
        db: &C,
        account_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<accounts::Model> {
        accounts::Entity::find_by_id(account_id.to_string())
            .filter(accounts::Column::UserId.eq(user_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))
    }

    pub(crate) async fn require_transaction<C: ConnectionTrait>(
        &self,
        db: &C,
        transaction_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<transactions::Model> {
        transactions::Entity::find_by_id(transaction_id.to_string())
            .filter(transactions::Column::UserId.eq(user_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))
    }

    pub(crate) async fn require_budget<C: ConnectionTrait>(
        &self,
        db: &C,
        budget_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<budgets::Model> {
        budgets::Entity::find_by_id(budget_id.to_string())
            .filter(budgets::Column::UserId.eq(user_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("budget not exists".to_string()))
    }
}
