//! Spending operations: CRUD plus the bulk currency re-conversion.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};

use crate::ops::{normalize_optional_text, normalize_required_text, with_tx};
use crate::{Engine, EngineError, ResultEngine, currency, spendings, users};

/// Input for creating or replacing a spending.
#[derive(Debug)]
pub struct NewSpending {
    pub amount: f64,
    /// Currency the amount was entered in; defaults to the user's
    /// preferred currency.
    pub currency: Option<String>,
    pub category: String,
    pub location: String,
    pub description: Option<String>,
    pub label: Option<String>,
    pub date: NaiveDate,
}

/// Conversion result applied to a row at write time.
struct WriteConversion {
    amount: f64,
    exchange_rate: f64,
    original_currency: String,
    display_currency: String,
}

impl Engine {
    /// Resolves the stored amount/rate for a write.
    ///
    /// Matching currencies keep the entered amount bit-for-bit with a rate
    /// of exactly 1.0; anything else goes through the rate provider and an
    /// unavailable rate aborts the write.
    async fn convert_for_write(
        &self,
        user: &users::Model,
        amount: f64,
        entered_currency: Option<String>,
    ) -> ResultEngine<WriteConversion> {
        if amount <= 0.0 {
            return Err(EngineError::Invalid(
                "amount must be greater than zero".to_string(),
            ));
        }

        let display_currency = user.preferred_currency.clone();
        let original_currency = match entered_currency {
            Some(code) => currency::normalize_code(&code)?,
            None => display_currency.clone(),
        };

        if original_currency == display_currency {
            return Ok(WriteConversion {
                amount,
                exchange_rate: 1.0,
                original_currency,
                display_currency,
            });
        }

        let conversion = self
            .currency()
            .convert(amount, &original_currency, &display_currency)
            .await
            .ok_or_else(|| EngineError::RateUnavailable {
                from: original_currency.clone(),
                to: display_currency.clone(),
            })?;

        Ok(WriteConversion {
            amount: conversion.converted_amount,
            exchange_rate: conversion.exchange_rate,
            original_currency,
            display_currency,
        })
    }

    pub async fn create_spending(
        &self,
        user: &users::Model,
        new: NewSpending,
    ) -> ResultEngine<spendings::Model> {
        self.ensure_schema().await?;

        let category = normalize_required_text(&new.category, "category")?;
        let location = normalize_required_text(&new.location, "location")?;
        let converted = self
            .convert_for_write(user, new.amount, new.currency)
            .await?;

        let row = spendings::ActiveModel {
            user_id: ActiveValue::Set(user.id),
            amount: ActiveValue::Set(converted.amount),
            original_amount: ActiveValue::Set(new.amount),
            original_currency: ActiveValue::Set(converted.original_currency),
            display_currency: ActiveValue::Set(converted.display_currency),
            exchange_rate: ActiveValue::Set(converted.exchange_rate),
            category: ActiveValue::Set(category),
            location: ActiveValue::Set(location),
            description: ActiveValue::Set(normalize_optional_text(new.description.as_deref())),
            label: ActiveValue::Set(normalize_optional_text(new.label.as_deref())),
            date: ActiveValue::Set(new.date),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };

        Ok(row.insert(&self.database).await?)
    }

    /// Newest-first page of the user's spendings.
    pub async fn list_spendings(
        &self,
        user_id: i32,
        skip: u64,
        limit: Option<u64>,
    ) -> ResultEngine<Vec<spendings::Model>> {
        Ok(spendings::Entity::find()
            .filter(spendings::Column::UserId.eq(user_id))
            .order_by_desc(spendings::Column::Date)
            .order_by_desc(spendings::Column::Id)
            .offset(skip)
            .limit(limit)
            .all(&self.database)
            .await?)
    }

    pub async fn spendings_by_date(
        &self,
        user_id: i32,
        date: NaiveDate,
    ) -> ResultEngine<Vec<spendings::Model>> {
        Ok(spendings::Entity::find()
            .filter(spendings::Column::UserId.eq(user_id))
            .filter(spendings::Column::Date.eq(date))
            .all(&self.database)
            .await?)
    }

    pub async fn spending_by_id(&self, user_id: i32, id: i32) -> ResultEngine<spendings::Model> {
        spendings::Entity::find_by_id(id)
            .filter(spendings::Column::UserId.eq(user_id))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("spending".to_string()))
    }

    /// Full replacement of one row, re-running the write-time conversion.
    pub async fn update_spending(
        &self,
        user: &users::Model,
        id: i32,
        new: NewSpending,
    ) -> ResultEngine<spendings::Model> {
        self.ensure_schema().await?;

        let existing = self.spending_by_id(user.id, id).await?;
        let category = normalize_required_text(&new.category, "category")?;
        let location = normalize_required_text(&new.location, "location")?;
        let converted = self
            .convert_for_write(user, new.amount, new.currency)
            .await?;

        let mut row: spendings::ActiveModel = existing.into();
        row.amount = ActiveValue::Set(converted.amount);
        row.original_amount = ActiveValue::Set(new.amount);
        row.original_currency = ActiveValue::Set(converted.original_currency);
        row.display_currency = ActiveValue::Set(converted.display_currency);
        row.exchange_rate = ActiveValue::Set(converted.exchange_rate);
        row.category = ActiveValue::Set(category);
        row.location = ActiveValue::Set(location);
        row.description = ActiveValue::Set(normalize_optional_text(new.description.as_deref()));
        row.label = ActiveValue::Set(normalize_optional_text(new.label.as_deref()));
        row.date = ActiveValue::Set(new.date);
        row.updated_at = ActiveValue::Set(Some(Utc::now()));

        Ok(row.update(&self.database).await?)
    }

    pub async fn delete_spending(&self, user_id: i32, id: i32) -> ResultEngine<()> {
        let existing = self.spending_by_id(user_id, id).await?;
        existing.delete(&self.database).await?;
        Ok(())
    }

    /// Re-converts every one of the user's rows into `target` and makes it
    /// the user's preferred currency.
    ///
    /// All rates are resolved before anything is written; one unavailable
    /// pair aborts the whole batch, and the batch itself runs in a single
    /// transaction so readers never observe a half-converted history.
    pub async fn convert_all_spendings(
        &self,
        user: &users::Model,
        target: &str,
    ) -> ResultEngine<u64> {
        self.ensure_schema().await?;
        let target = currency::normalize_code(target)?;

        let rows = spendings::Entity::find()
            .filter(spendings::Column::UserId.eq(user.id))
            .all(&self.database)
            .await?;

        let mut updates = Vec::with_capacity(rows.len());
        for row in rows {
            let rate = if row.original_currency == target {
                1.0
            } else {
                self.currency()
                    .exchange_rate(&row.original_currency, &target)
                    .await
                    .ok_or_else(|| EngineError::RateUnavailable {
                        from: row.original_currency.clone(),
                        to: target.clone(),
                    })?
                    .value
            };
            updates.push((row, rate));
        }

        let updated = updates.len() as u64;
        let now = Utc::now();

        with_tx!(self, |tx| {
            async {
                for (row, rate) in updates {
                    let amount = if row.original_currency == target {
                        row.original_amount
                    } else {
                        currency::round2(row.original_amount * rate)
                    };
                    let mut active: spendings::ActiveModel = row.into();
                    active.amount = ActiveValue::Set(amount);
                    active.display_currency = ActiveValue::Set(target.clone());
                    active.exchange_rate = ActiveValue::Set(rate);
                    active.updated_at = ActiveValue::Set(Some(now));
                    active.update(&tx).await?;
                }

                let mut account: users::ActiveModel = user.clone().into();
                account.preferred_currency = ActiveValue::Set(target.clone());
                account.updated_at = ActiveValue::Set(Some(now));
                account.update(&tx).await?;

                Ok::<_, EngineError>(())
            }
            .await
        })?;

        Ok(updated)
    }
}
