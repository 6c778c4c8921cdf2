//! Health check and read-only schema diagnostics.

use api_types::schema::{ColumnStatus, SchemaReport};
use axum::{Json, extract::State};

use crate::{ServerError, server::ServerState};
use engine::EngineError;

pub async fn check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Which expected columns the live schema actually has. Never mutates.
pub async fn schema_report(
    State(state): State<ServerState>,
) -> Result<Json<SchemaReport>, ServerError> {
    let report = engine::schema::report(state.engine.database())
        .await
        .map_err(EngineError::from)?;

    Ok(Json(SchemaReport {
        backend: report.backend.to_string(),
        columns: report
            .columns
            .into_iter()
            .map(|column| ColumnStatus {
                table: column.table.to_string(),
                column: column.column.to_string(),
                present: column.present,
            })
            .collect(),
    }))
}
