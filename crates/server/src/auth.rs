//! Registration, login, and JWT handling.

use api_types::auth::{LoginRequest, RegisterRequest, Token};
use api_types::user::UserView;
use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::extract::JsonOrForm;
use crate::server::ServerState;
use crate::{ServerError, users};
use engine::NewUser;

const TOKEN_TYPE: &str = "bearer";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User email.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

pub(crate) fn issue_token(
    secret: &str,
    email: &str,
    ttl_minutes: i64,
) -> Result<String, ServerError> {
    let now = Utc::now();
    let claims = Claims {
        sub: email.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::minutes(ttl_minutes)).timestamp(),
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|err| ServerError::Generic(format!("failed to issue token: {err}")))
}

/// Validates signature and expiry, returning the claims.
pub(crate) fn decode_token(secret: &str, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

fn token_response(state: &ServerState, email: &str) -> Result<Json<Token>, ServerError> {
    let access_token = issue_token(&state.auth.jwt_secret, email, state.auth.token_ttl_minutes)?;
    Ok(Json(Token {
        access_token,
        token_type: TOKEN_TYPE.to_string(),
    }))
}

pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Token>), ServerError> {
    let user = state
        .engine
        .create_user(NewUser {
            email: payload.email,
            full_name: payload.full_name,
            password: payload.password,
            is_admin: false,
            preferred_currency: None,
        })
        .await?;

    tracing::info!("registered user {}", user.email);
    Ok((StatusCode::CREATED, token_response(&state, &user.email)?))
}

pub async fn login(
    State(state): State<ServerState>,
    JsonOrForm(payload): JsonOrForm<LoginRequest>,
) -> Result<Json<Token>, ServerError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ServerError::Generic(
            "email and password required".to_string(),
        ));
    }

    let user = state
        .engine
        .authenticate(&payload.email, &payload.password)
        .await?;

    tracing::info!("login success for {} (admin: {})", user.email, user.is_admin);
    token_response(&state, &user.email)
}

pub async fn me(Extension(user): Extension<engine::users::Model>) -> Json<UserView> {
    Json(users::view(user))
}

/// Stateless logout: the client simply discards its token.
pub async fn logout() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "successfully logged out" }))
}
