use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::NaiveDate;
use engine::{
    CurrencyService, Engine, NewSpending, NewUser, RateSource, RateSourceError, SystemClock,
};
use migration::MigratorTrait;
use sea_orm::Database;

/// Counting rate source keyed by base currency.
pub struct StubRates {
    pub calls: Arc<AtomicUsize>,
    pub rates: HashMap<String, HashMap<String, f64>>,
}

#[async_trait::async_trait]
impl RateSource for StubRates {
    async fn latest_rates(&self, base: &str) -> Result<HashMap<String, f64>, RateSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.rates.get(base).cloned().unwrap_or_default())
    }
}

pub fn rate_table(entries: &[(&str, &str, f64)]) -> HashMap<String, HashMap<String, f64>> {
    let mut table: HashMap<String, HashMap<String, f64>> = HashMap::new();
    for (base, target, rate) in entries {
        table
            .entry((*base).to_string())
            .or_default()
            .insert((*target).to_string(), *rate);
    }
    table
}

pub async fn engine_with_rates(
    rates: HashMap<String, HashMap<String, f64>>,
) -> (Engine, Arc<AtomicUsize>) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let service = CurrencyService::new(
        Box::new(StubRates {
            calls: calls.clone(),
            rates,
        }),
        Box::new(SystemClock),
    );

    (
        Engine::builder().database(db).currency(service).build(),
        calls,
    )
}

pub async fn create_user(engine: &Engine, email: &str) -> engine::users::Model {
    engine
        .create_user(NewUser {
            email: email.to_string(),
            full_name: "Test User".to_string(),
            password: "pw1".to_string(),
            is_admin: false,
            preferred_currency: None,
        })
        .await
        .unwrap()
}

pub fn day(year: i32, month: u32, dom: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, dom).unwrap()
}

pub fn spending(amount: f64, currency: Option<&str>, category: &str, date: NaiveDate) -> NewSpending {
    NewSpending {
        amount,
        currency: currency.map(ToString::to_string),
        category: category.to_string(),
        location: "market".to_string(),
        description: None,
        label: None,
        date,
    }
}
