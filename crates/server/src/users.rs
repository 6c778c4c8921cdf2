//! Current-user endpoints.

use api_types::user::{UserUpdate, UserView};
use axum::{Extension, Json, extract::State};

use crate::{ServerError, server::ServerState};
use engine::UserChanges;

pub(crate) fn view(user: engine::users::Model) -> UserView {
    UserView {
        id: user.id,
        email: user.email,
        full_name: user.full_name,
        is_active: user.is_active,
        is_admin: user.is_admin,
        preferred_currency: user.preferred_currency,
        created_at: user.created_at,
    }
}

pub async fn me(Extension(user): Extension<engine::users::Model>) -> Json<UserView> {
    Json(view(user))
}

pub async fn update_me(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<UserView>, ServerError> {
    // Self-service updates cannot touch the admin/active flags.
    let updated = state
        .engine
        .update_user(
            user.id,
            UserChanges {
                email: payload.email,
                full_name: payload.full_name,
                preferred_currency: payload.preferred_currency,
                is_active: None,
                is_admin: None,
            },
        )
        .await?;

    Ok(Json(view(updated)))
}
