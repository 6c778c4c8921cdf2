//! Label analytics endpoints.

use api_types::dashboard::CategoryTotal;
use api_types::label::{LabelStats, LabelsOverview};
use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{ServerError, server::ServerState};

fn view(stats: engine::LabelStats, currency: &str) -> LabelStats {
    LabelStats {
        label: stats.label,
        total_spending: stats.total_spending,
        transaction_count: stats.transaction_count,
        average_per_transaction: stats.average_per_transaction,
        highest_spending_amount: stats.highest_spending_amount,
        highest_spending_date: stats.highest_spending_date,
        first_transaction_date: stats.first_transaction_date,
        last_transaction_date: stats.last_transaction_date,
        top_categories: stats
            .top_categories
            .into_iter()
            .map(|t| CategoryTotal {
                category: t.category,
                amount: t.amount,
            })
            .collect(),
        currency: currency.to_string(),
    }
}

pub async fn list(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<String>>, ServerError> {
    Ok(Json(state.engine.labels(user.id).await?))
}

pub async fn overview(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<LabelsOverview>, ServerError> {
    let stats = state.engine.labels_overview(user.id).await?;

    Ok(Json(LabelsOverview {
        total_labels: stats.len() as u64,
        labels_stats: stats
            .into_iter()
            .map(|s| view(s, &user.preferred_currency))
            .collect(),
    }))
}

pub async fn details(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Path(label): Path<String>,
) -> Result<Json<LabelStats>, ServerError> {
    let stats = state.engine.label_details(user.id, &label).await?;
    Ok(Json(view(stats, &user.preferred_currency)))
}
