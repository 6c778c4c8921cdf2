//! Account operations: registration, authentication, admin management.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};

use crate::ops::{normalize_required_text, with_tx};
use crate::{Engine, EngineError, ResultEngine, currency, password, spendings, users};

/// Input for creating an account (self-registration or admin-created).
#[derive(Debug)]
pub struct NewUser {
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub is_admin: bool,
    pub preferred_currency: Option<String>,
}

/// Partial account update; `None` fields are left untouched.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub preferred_currency: Option<String>,
    pub is_active: Option<bool>,
    pub is_admin: Option<bool>,
}

/// Admin dashboard aggregates.
#[derive(Debug)]
pub struct AdminCounts {
    pub total_users: u64,
    pub total_admins: u64,
    pub active_users: u64,
    pub inactive_users: u64,
    pub recent_users: Vec<users::Model>,
}

fn normalize_email(raw: &str) -> ResultEngine<String> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(EngineError::Invalid("invalid email address".to_string()));
    }
    Ok(email)
}

impl Engine {
    pub async fn create_user(&self, new: NewUser) -> ResultEngine<users::Model> {
        let email = normalize_email(&new.email)?;
        let full_name = normalize_required_text(&new.full_name, "full name")?;
        if new.password.is_empty() {
            return Err(EngineError::Invalid("password must not be empty".to_string()));
        }
        let preferred = match new.preferred_currency {
            Some(code) => currency::normalize_code(&code)?,
            None => "USD".to_string(),
        };

        if users::Entity::find()
            .filter(users::Column::Email.eq(&email))
            .one(&self.database)
            .await?
            .is_some()
        {
            return Err(EngineError::Invalid("email already registered".to_string()));
        }

        let user = users::ActiveModel {
            email: ActiveValue::Set(email),
            full_name: ActiveValue::Set(full_name),
            hashed_password: ActiveValue::Set(password::hash(&new.password)?),
            is_active: ActiveValue::Set(true),
            is_admin: ActiveValue::Set(new.is_admin),
            preferred_currency: ActiveValue::Set(preferred),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };

        Ok(user.insert(&self.database).await?)
    }

    /// Checks credentials and returns the account.
    ///
    /// Distinguishes "user not found" from "incorrect password" in the
    /// message; both map to 401.
    pub async fn authenticate(&self, email: &str, plain_password: &str) -> ResultEngine<users::Model> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::Unauthorized(format!("user not found: {email}")))?;

        if !password::verify(plain_password, &user.hashed_password) {
            return Err(EngineError::Unauthorized("incorrect password".to_string()));
        }
        if !user.is_active {
            return Err(EngineError::Forbidden("account is inactive".to_string()));
        }

        Ok(user)
    }

    pub async fn user_by_email(&self, email: &str) -> ResultEngine<users::Model> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("user".to_string()))
    }

    pub async fn user_by_id(&self, id: i32) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("user".to_string()))
    }

    pub async fn update_user(&self, id: i32, changes: UserChanges) -> ResultEngine<users::Model> {
        let user = self.user_by_id(id).await?;
        let mut active: users::ActiveModel = user.clone().into();

        if let Some(raw) = changes.email {
            let email = normalize_email(&raw)?;
            if email != user.email
                && users::Entity::find()
                    .filter(users::Column::Email.eq(&email))
                    .one(&self.database)
                    .await?
                    .is_some()
            {
                return Err(EngineError::Invalid("email already registered".to_string()));
            }
            active.email = ActiveValue::Set(email);
        }
        if let Some(full_name) = changes.full_name {
            active.full_name = ActiveValue::Set(normalize_required_text(&full_name, "full name")?);
        }
        if let Some(code) = changes.preferred_currency {
            active.preferred_currency = ActiveValue::Set(currency::normalize_code(&code)?);
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = ActiveValue::Set(is_active);
        }
        if let Some(is_admin) = changes.is_admin {
            active.is_admin = ActiveValue::Set(is_admin);
        }
        active.updated_at = ActiveValue::Set(Some(Utc::now()));

        Ok(active.update(&self.database).await?)
    }

    /// Deletes an account and all of its spendings.
    ///
    /// The cascade is issued explicitly so it behaves the same on backends
    /// where the foreign key pragma may be off.
    pub async fn delete_user(&self, id: i32) -> ResultEngine<()> {
        let user = self.user_by_id(id).await?;

        with_tx!(self, |tx| {
            async {
                spendings::Entity::delete_many()
                    .filter(spendings::Column::UserId.eq(user.id))
                    .exec(&tx)
                    .await?;
                users::Entity::delete_by_id(user.id).exec(&tx).await?;
                Ok::<_, EngineError>(())
            }
            .await
        })
    }

    pub async fn list_users(&self, skip: u64, limit: u64) -> ResultEngine<Vec<users::Model>> {
        Ok(users::Entity::find()
            .order_by_asc(users::Column::Id)
            .offset(skip)
            .limit(limit)
            .all(&self.database)
            .await?)
    }

    pub async fn admin_dashboard(&self) -> ResultEngine<AdminCounts> {
        let total_users = users::Entity::find()
            .filter(users::Column::IsAdmin.eq(false))
            .count(&self.database)
            .await?;
        let total_admins = users::Entity::find()
            .filter(users::Column::IsAdmin.eq(true))
            .count(&self.database)
            .await?;
        let active_users = users::Entity::find()
            .filter(users::Column::IsAdmin.eq(false))
            .filter(users::Column::IsActive.eq(true))
            .count(&self.database)
            .await?;
        let inactive_users = users::Entity::find()
            .filter(users::Column::IsAdmin.eq(false))
            .filter(users::Column::IsActive.eq(false))
            .count(&self.database)
            .await?;
        let recent_users = users::Entity::find()
            .filter(users::Column::IsAdmin.eq(false))
            .order_by_desc(users::Column::CreatedAt)
            .limit(5)
            .all(&self.database)
            .await?;

        Ok(AdminCounts {
            total_users,
            total_admins,
            active_users,
            inactive_users,
            recent_users,
        })
    }
}
