//! Per-label analytics.
//!
//! Labels are sparse free-form tags, so the per-label volumes are small;
//! stats are computed in memory from the matching rows rather than pushed
//! into SQL.

use std::cmp::Ordering;

use chrono::NaiveDate;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QuerySelect};

use crate::ops::CategoryTotal;
use crate::{Engine, EngineError, ResultEngine, spendings};

#[derive(Debug)]
pub struct LabelStats {
    pub label: String,
    pub total_spending: f64,
    pub transaction_count: u64,
    pub average_per_transaction: f64,
    pub highest_spending_amount: f64,
    pub highest_spending_date: NaiveDate,
    pub first_transaction_date: NaiveDate,
    pub last_transaction_date: NaiveDate,
    pub top_categories: Vec<CategoryTotal>,
}

/// Folds one label's rows into stats. Returns `None` for an empty slice.
///
/// `top_n` limits the category breakdown (the overview shows 3, the detail
/// view shows all). Ties keep first-seen row order.
fn stats_for(label: &str, rows: &[spendings::Model], top_n: Option<usize>) -> Option<LabelStats> {
    let first = rows.first()?;

    let mut total_spending = 0.0;
    let mut highest_amount = first.amount;
    let mut highest_date = first.date;
    let mut first_date = first.date;
    let mut last_date = first.date;
    let mut categories: Vec<CategoryTotal> = Vec::new();

    for row in rows {
        total_spending += row.amount;
        if row.amount > highest_amount {
            highest_amount = row.amount;
            highest_date = row.date;
        }
        first_date = first_date.min(row.date);
        last_date = last_date.max(row.date);

        match categories.iter_mut().find(|c| c.category == row.category) {
            Some(entry) => entry.amount += row.amount,
            None => categories.push(CategoryTotal {
                category: row.category.clone(),
                amount: row.amount,
            }),
        }
    }

    categories.sort_by(|a, b| b.amount.partial_cmp(&a.amount).unwrap_or(Ordering::Equal));
    if let Some(n) = top_n {
        categories.truncate(n);
    }

    let transaction_count = rows.len() as u64;
    Some(LabelStats {
        label: label.to_string(),
        total_spending,
        transaction_count,
        average_per_transaction: total_spending / transaction_count as f64,
        highest_spending_amount: highest_amount,
        highest_spending_date: highest_date,
        first_transaction_date: first_date,
        last_transaction_date: last_date,
        top_categories: categories,
    })
}

impl Engine {
    /// Distinct non-empty labels used by the user.
    pub async fn labels(&self, user_id: i32) -> ResultEngine<Vec<String>> {
        self.ensure_schema().await?;

        let rows: Vec<String> = spendings::Entity::find()
            .select_only()
            .column(spendings::Column::Label)
            .filter(spendings::Column::UserId.eq(user_id))
            .filter(spendings::Column::Label.is_not_null())
            .filter(spendings::Column::Label.ne(""))
            .distinct()
            .into_tuple()
            .all(&self.database)
            .await?;

        Ok(rows
            .into_iter()
            .filter(|label| !label.trim().is_empty())
            .collect())
    }

    /// Stats for every label, sorted by total spending descending.
    pub async fn labels_overview(&self, user_id: i32) -> ResultEngine<Vec<LabelStats>> {
        let labels = self.labels(user_id).await?;

        let mut stats = Vec::with_capacity(labels.len());
        for label in labels {
            let rows = spendings::Entity::find()
                .filter(spendings::Column::UserId.eq(user_id))
                .filter(spendings::Column::Label.eq(&label))
                .all(&self.database)
                .await?;
            if let Some(stat) = stats_for(&label, &rows, Some(3)) {
                stats.push(stat);
            }
        }

        stats.sort_by(|a, b| {
            b.total_spending
                .partial_cmp(&a.total_spending)
                .unwrap_or(Ordering::Equal)
        });
        Ok(stats)
    }

    pub async fn label_details(&self, user_id: i32, label: &str) -> ResultEngine<LabelStats> {
        self.ensure_schema().await?;

        let label = label.trim();
        let rows = spendings::Entity::find()
            .filter(spendings::Column::UserId.eq(user_id))
            .filter(spendings::Column::Label.eq(label))
            .all(&self.database)
            .await?;

        stats_for(label, &rows, None).ok_or_else(|| EngineError::NotFound("label".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(amount: f64, category: &str, day: u32) -> spendings::Model {
        spendings::Model {
            id: 0,
            user_id: 1,
            amount,
            original_amount: amount,
            original_currency: "USD".to_string(),
            display_currency: "USD".to_string(),
            exchange_rate: 1.0,
            category: category.to_string(),
            location: "somewhere".to_string(),
            description: None,
            label: Some("trip".to_string()),
            date: NaiveDate::from_ymd_opt(2026, 7, day).unwrap(),
            created_at: chrono::Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn empty_rows_have_no_stats() {
        assert!(stats_for("trip", &[], None).is_none());
    }

    #[test]
    fn stats_track_extremes_and_averages() {
        let rows = vec![row(10.0, "food", 3), row(30.0, "travel", 1), row(20.0, "food", 9)];
        let stats = stats_for("trip", &rows, None).unwrap();

        assert_eq!(stats.total_spending, 60.0);
        assert_eq!(stats.transaction_count, 3);
        assert_eq!(stats.average_per_transaction, 20.0);
        assert_eq!(stats.highest_spending_amount, 30.0);
        assert_eq!(
            stats.highest_spending_date,
            NaiveDate::from_ymd_opt(2026, 7, 1).unwrap()
        );
        assert_eq!(
            stats.first_transaction_date,
            NaiveDate::from_ymd_opt(2026, 7, 1).unwrap()
        );
        assert_eq!(
            stats.last_transaction_date,
            NaiveDate::from_ymd_opt(2026, 7, 9).unwrap()
        );
    }

    #[test]
    fn categories_sorted_by_total_and_truncated() {
        let rows = vec![
            row(5.0, "coffee", 1),
            row(40.0, "hotel", 2),
            row(10.0, "coffee", 3),
            row(8.0, "food", 4),
        ];
        let stats = stats_for("trip", &rows, Some(2)).unwrap();

        assert_eq!(stats.top_categories.len(), 2);
        assert_eq!(stats.top_categories[0].category, "hotel");
        assert_eq!(stats.top_categories[1].category, "coffee");
        assert_eq!(stats.top_categories[1].amount, 15.0);
    }
}
