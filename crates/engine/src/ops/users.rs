//! User lifecycle operations.

use chrono::Utc;
use sea_orm::{
    ActiveValue, QueryFilter, Statement, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, User, users};

use super::{Engine, normalize_required_text, with_tx};

impl Engine {
    /// Register a user. The email is normalized to lowercase and must be
    /// unique.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> ResultEngine<User> {
        let name = normalize_required_text(name, "name")?;
        let email = normalize_required_text(email, "email")?.to_lowercase();

        with_tx!(self, |db_tx| {
            let exists = users::Entity::find()
                .filter(users::Column::Email.eq(email.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(email));
            }

            let now = Utc::now();
            let user = User {
                id: Uuid::new_v4(),
                name,
                email,
                password_hash: password_hash.to_string(),
                created_at: now,
                updated_at: now,
            };
            users::ActiveModel::from(&user).insert(&db_tx).await?;
            Ok(user)
        })
    }

    pub async fn user_by_id(&self, user_id: Uuid) -> ResultEngine<User> {
        let model = self.require_user(&self.database, user_id).await?;
        User::try_from(model)
    }

    pub async fn user_by_email(&self, email: &str) -> ResultEngine<User> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
        User::try_from(model)
    }

    /// Update display name and/or email. `None` fields are left unchanged.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        name: Option<&str>,
        email: Option<&str>,
    ) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let model = self.require_user(&db_tx, user_id).await?;
            let mut user = User::try_from(model)?;

            if let Some(name) = name {
                user.name = normalize_required_text(name, "name")?;
            }
            if let Some(email) = email {
                let email = normalize_required_text(email, "email")?.to_lowercase();
                let taken = users::Entity::find()
                    .filter(users::Column::Email.eq(email.clone()))
                    .filter(users::Column::Id.ne(user_id.to_string()))
                    .one(&db_tx)
                    .await?
                    .is_some();
                if taken {
                    return Err(EngineError::ExistingKey(email));
                }
                user.email = email;
            }
            user.updated_at = Utc::now();

            users::ActiveModel::from(&user).update(&db_tx).await?;
            Ok(user)
        })
    }

    /// Store a new password hash. Verifying the current password against the
    /// stored hash is the caller's job; the engine never sees plaintext.
    pub async fn change_password(&self, user_id: Uuid, password_hash: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let update = users::ActiveModel {
                id: ActiveValue::Set(user_id.to_string()),
                password_hash: ActiveValue::Set(password_hash.to_string()),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            update.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Delete a user and everything they own, in one DB transaction.
    pub async fn delete_user(&self, user_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;

            let backend = self.database.get_database_backend();
            for table in ["transactions", "budgets", "accounts"] {
                db_tx
                    .execute(Statement::from_sql_and_values(
                        backend,
                        format!("DELETE FROM {table} WHERE user_id = ?;"),
                        vec![user_id.to_string().into()],
                    ))
                    .await?;
            }
            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM users WHERE id = ?;",
                    vec![user_id.to_string().into()],
                ))
                .await?;

            Ok(())
        })
    }
}
