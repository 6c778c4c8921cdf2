use std::sync::atomic::{AtomicBool, Ordering};

use sea_orm::DatabaseConnection;

use crate::rates::{CurrencyService, DEFAULT_RATE_API};
use crate::{EngineError, ResultEngine, schema};

mod dashboard;
mod labels;
mod spendings;
mod users;

pub use dashboard::{CategoryTotal, DashboardStats};
pub use labels::LabelStats;
pub use spendings::NewSpending;
pub use users::{AdminCounts, NewUser, UserChanges};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    currency: CurrencyService,
    schema_ready: AtomicBool,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn currency(&self) -> &CurrencyService {
        &self.currency
    }

    pub fn database(&self) -> &DatabaseConnection {
        &self.database
    }

    /// Makes sure the expected columns exist before touching them.
    ///
    /// Healing runs at most once per process: the first successful pass
    /// flips an atomic flag and every later call is a plain load. This is
    /// the fallback for deployments where traffic arrives before the
    /// startup pass ran; on embedded databases the pass is a no-op.
    pub async fn ensure_schema(&self) -> ResultEngine<()> {
        if self.schema_ready.load(Ordering::Acquire) {
            return Ok(());
        }
        schema::heal(&self.database).await?;
        self.schema_ready.store(true, Ordering::Release);
        Ok(())
    }
}

fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Invalid(format!("{label} must not be empty")));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    currency: Option<CurrencyService>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Override the currency service (tests inject a stub source/clock).
    pub fn currency(mut self, service: CurrencyService) -> EngineBuilder {
        self.currency = Some(service);
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> Engine {
        Engine {
            database: self.database,
            currency: self
                .currency
                .unwrap_or_else(|| CurrencyService::with_http(DEFAULT_RATE_API)),
            schema_ready: AtomicBool::new(false),
        }
    }
}
