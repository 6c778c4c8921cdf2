//! Dashboard aggregates over one user's spendings.
//!
//! Date windows match the product definition: "this month" is the 1st
//! through today inclusive, the weekly total looks back 7 days, and the
//! daily average divides the trailing-30-day total by a flat 30. `today`
//! is injected by the caller so the windows are testable.

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};
use sea_orm::sea_query::{Alias, Expr};
use sea_orm::{
    ColumnTrait, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use crate::{Engine, ResultEngine, spendings};

#[derive(Clone, Debug, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
}

#[derive(Debug)]
pub struct DashboardStats {
    pub total_spending: f64,
    pub average_daily: f64,
    pub weekly_spending: f64,
    pub monthly_transactions: u64,
    pub highest_single_spending: f64,
    pub top_categories: Vec<CategoryTotal>,
    pub category_distribution: Vec<CategoryTotal>,
    /// Seven daily totals, oldest first, ending today.
    pub weekly_trend: Vec<(NaiveDate, f64)>,
    pub recent_spendings: Vec<spendings::Model>,
}

#[derive(FromQueryResult)]
struct SumRow {
    total: Option<f64>,
}

#[derive(FromQueryResult)]
struct MaxRow {
    highest: Option<f64>,
}

#[derive(FromQueryResult)]
struct CategoryRow {
    category: String,
    total: Option<f64>,
}

#[derive(FromQueryResult)]
struct DayRow {
    date: NaiveDate,
    total: Option<f64>,
}

impl Engine {
    async fn spending_sum(
        &self,
        user_id: i32,
        from: NaiveDate,
        to_inclusive: Option<NaiveDate>,
    ) -> ResultEngine<f64> {
        let mut query = spendings::Entity::find()
            .select_only()
            .column_as(spendings::Column::Amount.sum(), "total")
            .filter(spendings::Column::UserId.eq(user_id))
            .filter(spendings::Column::Date.gte(from));
        if let Some(to) = to_inclusive {
            query = query.filter(spendings::Column::Date.lte(to));
        }

        let row = query.into_model::<SumRow>().one(&self.database).await?;
        Ok(row.and_then(|r| r.total).unwrap_or(0.0))
    }

    pub async fn dashboard(&self, user_id: i32, today: NaiveDate) -> ResultEngine<DashboardStats> {
        let first_of_month = today.with_day(1).unwrap_or(today);
        let seven_days_ago = today - Duration::days(7);
        let thirty_days_ago = today - Duration::days(30);

        let total_spending = self
            .spending_sum(user_id, first_of_month, Some(today))
            .await?;
        let weekly_spending = self.spending_sum(user_id, seven_days_ago, None).await?;
        let recent_total = self.spending_sum(user_id, thirty_days_ago, None).await?;
        let average_daily = if recent_total > 0.0 {
            recent_total / 30.0
        } else {
            0.0
        };

        let monthly_transactions = spendings::Entity::find()
            .filter(spendings::Column::UserId.eq(user_id))
            .filter(spendings::Column::Date.gte(first_of_month))
            .filter(spendings::Column::Date.lte(today))
            .count(&self.database)
            .await?;

        let highest_single_spending = spendings::Entity::find()
            .select_only()
            .column_as(spendings::Column::Amount.max(), "highest")
            .filter(spendings::Column::UserId.eq(user_id))
            .filter(spendings::Column::Date.gte(first_of_month))
            .filter(spendings::Column::Date.lte(today))
            .into_model::<MaxRow>()
            .one(&self.database)
            .await?
            .and_then(|r| r.highest)
            .unwrap_or(0.0);

        let category_rows = spendings::Entity::find()
            .select_only()
            .column(spendings::Column::Category)
            .column_as(spendings::Column::Amount.sum(), "total")
            .filter(spendings::Column::UserId.eq(user_id))
            .filter(spendings::Column::Date.gte(first_of_month))
            .group_by(spendings::Column::Category)
            .order_by_desc(Expr::col(Alias::new("total")))
            .into_model::<CategoryRow>()
            .all(&self.database)
            .await?;
        let category_distribution: Vec<CategoryTotal> = category_rows
            .into_iter()
            .map(|row| CategoryTotal {
                category: row.category,
                amount: row.total.unwrap_or(0.0),
            })
            .collect();
        let top_categories: Vec<CategoryTotal> =
            category_distribution.iter().take(5).cloned().collect();

        let trend_start = today - Duration::days(6);
        let day_rows = spendings::Entity::find()
            .select_only()
            .column(spendings::Column::Date)
            .column_as(spendings::Column::Amount.sum(), "total")
            .filter(spendings::Column::UserId.eq(user_id))
            .filter(spendings::Column::Date.gte(trend_start))
            .filter(spendings::Column::Date.lte(today))
            .group_by(spendings::Column::Date)
            .into_model::<DayRow>()
            .all(&self.database)
            .await?;
        let by_day: HashMap<NaiveDate, f64> = day_rows
            .into_iter()
            .map(|row| (row.date, row.total.unwrap_or(0.0)))
            .collect();
        let weekly_trend: Vec<(NaiveDate, f64)> = (0..7)
            .rev()
            .map(|offset| {
                let day = today - Duration::days(offset);
                (day, by_day.get(&day).copied().unwrap_or(0.0))
            })
            .collect();

        let recent_spendings = spendings::Entity::find()
            .filter(spendings::Column::UserId.eq(user_id))
            .order_by_desc(spendings::Column::Date)
            .order_by_desc(spendings::Column::Id)
            .limit(5)
            .all(&self.database)
            .await?;

        Ok(DashboardStats {
            total_spending,
            average_daily,
            weekly_spending,
            monthly_transactions,
            highest_single_spending,
            top_categories,
            category_distribution,
            weekly_trend,
            recent_spendings,
        })
    }
}
