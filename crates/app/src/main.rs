use migration::{Migrator, MigratorTrait};

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "bilancio={level},server={level},engine={level}",
            level = settings.log_level
        ))
        .init();

    let db = sea_orm::Database::connect(&settings.database_url).await?;
    Migrator::up(&db, None).await?;

    // Production databases that predate the migration table may still be
    // missing columns; patch them in place. Failures must not stop the
    // server from coming up.
    match engine::schema::heal(&db).await {
        Ok(report) if report.skipped => {
            tracing::debug!("schema healing skipped (embedded database)");
        }
        Ok(report) => {
            if !report.applied.is_empty() {
                tracing::info!("schema healing applied {} statement(s)", report.applied.len());
            }
        }
        Err(err) => tracing::error!("schema healing failed, continuing anyway: {err}"),
    }

    let currency = engine::CurrencyService::with_http(&settings.rate_api_url);
    let engine = engine::Engine::builder()
        .database(db)
        .currency(currency)
        .build();

    let bind = settings.bind.clone().unwrap_or_else(|| "0.0.0.0".to_string());
    let listener = tokio::net::TcpListener::bind(format!("{bind}:{}", settings.port)).await?;

    let options = server::ServerOptions {
        jwt_secret: settings.jwt_secret.clone(),
        token_ttl_minutes: settings.token_ttl_minutes,
        cors_origins: settings.cors_origins(),
    };
    server::run_with_listener(engine, options, listener).await?;

    Ok(())
}
