use axum::{
    Json, Router,
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode, header},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use std::sync::Arc;

use crate::{ServerError, admin, auth, currency, health, labels, spendings, users};
use engine::{Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub auth: AuthConfig,
}

#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
}

/// Runtime knobs the binary reads from its settings.
#[derive(Clone, Debug)]
pub struct ServerOptions {
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub cors_origins: Vec<String>,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production".to_string(),
            // A week, mirroring the long-lived sessions the frontend expects.
            token_ttl_minutes: 7 * 24 * 60,
            cors_origins: vec!["http://localhost:5173".to_string()],
        }
    }
}

/// Resolves the bearer token into a user and stashes it as an extension.
async fn auth_layer(
    auth_header: Option<TypedHeader<Authorization<Bearer>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(bearer)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    let claims = auth::decode_token(&state.auth.jwt_secret, bearer.token())
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let user = state
        .engine
        .user_by_email(&claims.sub)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;
    if !user.is_active {
        return Err(StatusCode::UNAUTHORIZED);
    }

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Runs after `auth_layer`; rejects non-admin accounts.
async fn require_admin(request: Request, next: Next) -> Result<Response, ServerError> {
    match request.extensions().get::<engine::users::Model>() {
        Some(user) if user.is_admin => Ok(next.run(request).await),
        Some(_) => Err(EngineError::Forbidden("admin access required".to_string()).into()),
        None => Err(EngineError::Unauthorized("not authenticated".to_string()).into()),
    }
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Budget Tracking API" }))
}

fn router(state: ServerState) -> Router {
    let admin_routes = Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route(
            "/users/{id}",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::delete_user),
        )
        .route("/users/{id}/spendings", get(admin::user_spendings))
        .route_layer(middleware::from_fn(require_admin));

    let authed = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/users/me", get(users::me).patch(users::update_me))
        .route("/spendings", post(spendings::create).get(spendings::list))
        .route("/spendings/dashboard", get(spendings::dashboard))
        .route("/spendings/date/{date}", get(spendings::by_date))
        .route(
            "/spendings/convert-currency/{target}",
            post(spendings::convert_currency),
        )
        .route(
            "/spendings/{id}",
            put(spendings::update).delete(spendings::delete),
        )
        .route("/labels/list", get(labels::list))
        .route("/labels/", get(labels::overview))
        .route("/labels/{label}", get(labels::details))
        .route("/exchange-rate/{from}/{to}", get(currency::exchange_rate))
        .route("/convert", post(currency::convert))
        .nest("/admin", admin_routes)
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_layer));

    let public = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/currencies", get(currency::list));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health::check))
        .route("/health/schema", get(health::schema_report))
        .nest("/api", public.merge(authed))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

pub async fn run_with_listener(
    engine: Engine,
    options: ServerOptions,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        auth: AuthConfig {
            jwt_secret: options.jwt_secret.clone(),
            token_ttl_minutes: options.token_ttl_minutes,
        },
    };

    let app = router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&options.cors_origins));

    axum::serve(listener, app).await
}

pub fn spawn_with_listener(
    engine: Engine,
    options: ServerOptions,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, options, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;
    use std::collections::HashMap;
    use tower::ServiceExt;

    use engine::{CurrencyService, RateSource, RateSourceError, SystemClock};
    use migration::MigratorTrait;

    struct StubRates;

    #[async_trait::async_trait]
    impl RateSource for StubRates {
        async fn latest_rates(
            &self,
            base: &str,
        ) -> Result<HashMap<String, f64>, RateSourceError> {
            match base {
                "EUR" => Ok(HashMap::from([("USD".to_string(), 1.25)])),
                "USD" => Ok(HashMap::from([("EUR".to_string(), 0.8)])),
                _ => Ok(HashMap::new()),
            }
        }
    }

    async fn test_state() -> ServerState {
        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();

        let currency = CurrencyService::new(Box::new(StubRates), Box::new(SystemClock));
        let engine = Engine::builder().database(db).currency(currency).build();

        ServerState {
            engine: Arc::new(engine),
            auth: AuthConfig {
                jwt_secret: "test-secret".to_string(),
                token_ttl_minutes: 60,
            },
        }
    }

    async fn send(
        state: &ServerState,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = axum::http::Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, json)
    }

    async fn register(state: &ServerState, email: &str, password: &str) -> String {
        let (status, body) = send(
            state,
            "POST",
            "/api/auth/register",
            None,
            Some(serde_json::json!({
                "email": email,
                "full_name": "Test User",
                "password": password,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["access_token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_is_open() {
        let state = test_state().await;
        let (status, body) = send(&state, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn spendings_require_a_token() {
        let state = test_state().await;
        let (status, _) = send(&state, "GET", "/api/spendings", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn register_login_and_same_currency_spending() {
        let state = test_state().await;
        register(&state, "a@x.com", "pw1").await;

        // JSON login.
        let (status, body) = send(
            &state,
            "POST",
            "/api/auth/login",
            None,
            Some(serde_json::json!({ "email": "a@x.com", "password": "pw1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["token_type"], "bearer");
        let token = body["access_token"].as_str().unwrap().to_string();

        let today = chrono::Utc::now().date_naive().to_string();
        let (status, body) = send(
            &state,
            "POST",
            "/api/spendings",
            Some(&token),
            Some(serde_json::json!({
                "amount": 25.50,
                "currency": "USD",
                "category": "food",
                "location": "market",
                "date": today,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["amount"], 25.50);
        assert_eq!(body["original_amount"], 25.50);
        assert_eq!(body["exchange_rate"], 1.0);
        assert_eq!(body["display_currency"], "USD");
    }

    #[tokio::test]
    async fn form_login_is_accepted() {
        let state = test_state().await;
        register(&state, "form@x.com", "pw1").await;

        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("email=form%40x.com&password=pw1"))
            .unwrap();
        let response = router(state.clone()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn wrong_password_is_401() {
        let state = test_state().await;
        register(&state, "b@x.com", "pw1").await;

        let (status, _) = send(
            &state,
            "POST",
            "/api/auth/login",
            None,
            Some(serde_json::json!({ "email": "b@x.com", "password": "other" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn empty_dashboard_is_all_zeros() {
        let state = test_state().await;
        let token = register(&state, "c@x.com", "pw1").await;

        let (status, body) = send(
            &state,
            "GET",
            "/api/spendings/dashboard",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_spending"], 0.0);
        assert_eq!(body["monthly_transactions"], 0);
        assert_eq!(body["top_categories"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn cross_currency_spending_uses_stub_rate() {
        let state = test_state().await;
        let token = register(&state, "d@x.com", "pw1").await;

        let today = chrono::Utc::now().date_naive().to_string();
        let (status, body) = send(
            &state,
            "POST",
            "/api/spendings",
            Some(&token),
            Some(serde_json::json!({
                "amount": 10.0,
                "currency": "EUR",
                "category": "travel",
                "location": "airport",
                "date": today,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["amount"], 12.5);
        assert_eq!(body["exchange_rate"], 1.25);
        assert_eq!(body["original_currency"], "EUR");
        assert_eq!(body["display_currency"], "USD");
    }

    #[tokio::test]
    async fn admin_routes_reject_regular_users() {
        let state = test_state().await;
        let token = register(&state, "e@x.com", "pw1").await;

        let (status, _) = send(&state, "GET", "/api/admin/dashboard", Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn currencies_list_is_open_and_fixed() {
        let state = test_state().await;
        let (status, body) = send(&state, "GET", "/api/currencies", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 20);
    }

    #[tokio::test]
    async fn garbage_token_is_401() {
        let state = test_state().await;
        let (status, _) = send(
            &state,
            "GET",
            "/api/users/me",
            Some("not-a-real-token"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
