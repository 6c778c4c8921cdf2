//! Admin user-management endpoints. Every route here sits behind the
//! admin middleware.

use api_types::admin::{AdminDashboard, AdminUserNew, PageQuery};
use api_types::spending::SpendingView;
use api_types::user::{UserUpdate, UserView};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState, spendings, users};
use engine::{EngineError, NewUser, UserChanges};

pub async fn dashboard(
    State(state): State<ServerState>,
) -> Result<Json<AdminDashboard>, ServerError> {
    let counts = state.engine.admin_dashboard().await?;

    Ok(Json(AdminDashboard {
        total_users: counts.total_users,
        total_admins: counts.total_admins,
        active_users: counts.active_users,
        inactive_users: counts.inactive_users,
        recent_users: counts.recent_users.into_iter().map(users::view).collect(),
    }))
}

pub async fn list_users(
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<UserView>>, ServerError> {
    let rows = state
        .engine
        .list_users(query.skip.unwrap_or(0), query.limit.unwrap_or(100))
        .await?;
    Ok(Json(rows.into_iter().map(users::view).collect()))
}

pub async fn get_user(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<UserView>, ServerError> {
    Ok(Json(users::view(state.engine.user_by_id(id).await?)))
}

pub async fn create_user(
    State(state): State<ServerState>,
    Json(payload): Json<AdminUserNew>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let user = state
        .engine
        .create_user(NewUser {
            email: payload.email,
            full_name: payload.full_name,
            password: payload.password,
            is_admin: payload.is_admin,
            preferred_currency: None,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(users::view(user))))
}

pub async fn update_user(
    Extension(admin): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<UserView>, ServerError> {
    if id == admin.id && payload.is_active == Some(false) {
        return Err(EngineError::Invalid(
            "cannot deactivate your own account".to_string(),
        )
        .into());
    }

    let updated = state
        .engine
        .update_user(
            id,
            UserChanges {
                email: payload.email,
                full_name: payload.full_name,
                preferred_currency: payload.preferred_currency,
                is_active: payload.is_active,
                is_admin: payload.is_admin,
            },
        )
        .await?;
    Ok(Json(users::view(updated)))
}

pub async fn delete_user(
    Extension(admin): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>, ServerError> {
    if id == admin.id {
        return Err(EngineError::Invalid("cannot delete your own account".to_string()).into());
    }

    state.engine.delete_user(id).await?;
    Ok(Json(serde_json::json!({
        "message": "user deleted successfully"
    })))
}

pub async fn user_spendings(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<SpendingView>>, ServerError> {
    state.engine.user_by_id(id).await?;
    let rows = state.engine.list_spendings(id, 0, None).await?;
    Ok(Json(rows.into_iter().map(spendings::view).collect()))
}
