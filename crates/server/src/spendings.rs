//! Spending CRUD, dashboard, and bulk re-conversion endpoints.

use api_types::dashboard::{CategoryTotal, DashboardStats, DayTotal};
use api_types::spending::{BulkConversion, SpendingListQuery, SpendingNew, SpendingView};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{NaiveDate, Utc};

use crate::{ServerError, server::ServerState};
use engine::NewSpending;

pub(crate) fn view(row: engine::spendings::Model) -> SpendingView {
    SpendingView {
        id: row.id,
        amount: row.amount,
        original_amount: row.original_amount,
        original_currency: row.original_currency,
        display_currency: row.display_currency,
        exchange_rate: row.exchange_rate,
        category: row.category,
        location: row.location,
        description: row.description,
        label: row.label,
        date: row.date,
        user_id: row.user_id,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn into_new(payload: SpendingNew) -> NewSpending {
    NewSpending {
        amount: payload.amount,
        currency: payload.currency,
        category: payload.category,
        location: payload.location,
        description: payload.description,
        label: payload.label,
        date: payload.date,
    }
}

pub async fn create(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<SpendingNew>,
) -> Result<(StatusCode, Json<SpendingView>), ServerError> {
    let row = state
        .engine
        .create_spending(&user, into_new(payload))
        .await?;
    Ok((StatusCode::CREATED, Json(view(row))))
}

pub async fn list(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Query(query): Query<SpendingListQuery>,
) -> Result<Json<Vec<SpendingView>>, ServerError> {
    let rows = state
        .engine
        .list_spendings(
            user.id,
            query.skip.unwrap_or(0),
            Some(query.limit.unwrap_or(100)),
        )
        .await?;
    Ok(Json(rows.into_iter().map(view).collect()))
}

pub async fn by_date(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Path(date): Path<NaiveDate>,
) -> Result<Json<Vec<SpendingView>>, ServerError> {
    let rows = state.engine.spendings_by_date(user.id, date).await?;
    Ok(Json(rows.into_iter().map(view).collect()))
}

pub async fn update(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<SpendingNew>,
) -> Result<Json<SpendingView>, ServerError> {
    let row = state
        .engine
        .update_spending(&user, id, into_new(payload))
        .await?;
    Ok(Json(view(row)))
}

pub async fn delete(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>, ServerError> {
    state.engine.delete_spending(user.id, id).await?;
    Ok(Json(serde_json::json!({
        "message": "spending deleted successfully"
    })))
}

pub async fn dashboard(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<DashboardStats>, ServerError> {
    let today = Utc::now().date_naive();
    let stats = state.engine.dashboard(user.id, today).await?;

    let map_categories = |totals: Vec<engine::CategoryTotal>| {
        totals
            .into_iter()
            .map(|t| CategoryTotal {
                category: t.category,
                amount: t.amount,
            })
            .collect()
    };

    Ok(Json(DashboardStats {
        total_spending: stats.total_spending,
        average_daily: stats.average_daily,
        weekly_spending: stats.weekly_spending,
        monthly_transactions: stats.monthly_transactions,
        highest_single_spending: stats.highest_single_spending,
        top_categories: map_categories(stats.top_categories),
        category_distribution: map_categories(stats.category_distribution),
        weekly_trend: stats
            .weekly_trend
            .into_iter()
            .map(|(date, amount)| DayTotal {
                date: date.format("%m/%d").to_string(),
                amount,
            })
            .collect(),
        recent_spendings: stats.recent_spendings.into_iter().map(view).collect(),
        currency: user.preferred_currency,
    }))
}

/// Re-converts the user's entire history into `target` and makes it their
/// preferred currency.
pub async fn convert_currency(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Path(target): Path<String>,
) -> Result<Json<BulkConversion>, ServerError> {
    let updated = state.engine.convert_all_spendings(&user, &target).await?;
    Ok(Json(BulkConversion {
        target_currency: target.trim().to_uppercase(),
        updated,
    }))
}
