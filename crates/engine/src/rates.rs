//! Exchange-rate lookup with an in-process cache.
//!
//! Rates come from the provider's "latest rates for a base currency"
//! endpoint and are cached per ordered pair for one hour. Unavailability is
//! a value (`None`), never an error: a provider outage must surface as a
//! user-facing "conversion not possible" response, not a crash, and the
//! next request simply tries again. No retries, no backoff.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::currency::round2;

/// Default provider endpoint (free tier).
pub const DEFAULT_RATE_API: &str = "https://api.exchangerate-api.com/v4";

/// Cached rates are reused for one hour before a fresh fetch.
const CACHE_TTL_SECS: i64 = 3600;

/// Outbound requests give up after this long.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Time source for cache expiry; injected so tests can steer the clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Error)]
pub enum RateSourceError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("provider returned status {0}")]
    Status(u16),
    #[error("malformed payload: {0}")]
    Payload(String),
}

/// Upstream supplier of "one unit of `base` in every other currency".
#[async_trait::async_trait]
pub trait RateSource: Send + Sync {
    async fn latest_rates(&self, base: &str) -> Result<HashMap<String, f64>, RateSourceError>;
}

/// Provider client speaking the `GET {base_url}/latest/{code}` protocol
/// with a JSON `{"rates": {code: rate}}` body.
pub struct HttpRateSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRateSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LatestRates {
    #[serde(default)]
    rates: HashMap<String, f64>,
}

#[async_trait::async_trait]
impl RateSource for HttpRateSource {
    async fn latest_rates(&self, base: &str) -> Result<HashMap<String, f64>, RateSourceError> {
        let url = format!("{}/latest/{}", self.base_url.trim_end_matches('/'), base);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| RateSourceError::Request(err.to_string()))?;

        if !response.status().is_success() {
            return Err(RateSourceError::Status(response.status().as_u16()));
        }

        let payload: LatestRates = response
            .json()
            .await
            .map_err(|err| RateSourceError::Payload(err.to_string()))?;
        Ok(payload.rates)
    }
}

/// A resolved exchange rate.
///
/// `fetched_at` is `None` for the `from == to` fast path, which never
/// touches the cache or the network.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rate {
    pub value: f64,
    pub fetched_at: Option<DateTime<Utc>>,
}

/// Result of converting an amount between two currencies.
#[derive(Clone, Debug, PartialEq)]
pub struct Conversion {
    pub original_amount: f64,
    pub original_currency: String,
    pub target_currency: String,
    pub converted_amount: f64,
    pub exchange_rate: f64,
}

struct CacheEntry {
    rate: f64,
    fetched_at: DateTime<Utc>,
}

/// Rate cache plus provider client, constructed once per process and owned
/// by the [`Engine`](crate::Engine).
///
/// Concurrent readers race benignly: the worst case is a redundant fetch or
/// a slightly stale rate, since each entry is independently keyed and
/// replaced whole. Entries are only superseded on the next read after
/// expiry, never proactively purged; the map is bounded by the number of
/// distinct pairs actually requested.
pub struct CurrencyService {
    source: Box<dyn RateSource>,
    clock: Box<dyn Clock>,
    cache: Mutex<HashMap<String, CacheEntry>>,
}

impl CurrencyService {
    pub fn new(source: Box<dyn RateSource>, clock: Box<dyn Clock>) -> Self {
        Self {
            source,
            clock,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_http(base_url: &str) -> Self {
        Self::new(Box::new(HttpRateSource::new(base_url)), Box::new(SystemClock))
    }

    /// Multiplicative rate turning one unit of `from` into `to`.
    ///
    /// `None` means "conversion not possible right now": network failure,
    /// non-success status, undecodable payload, or a payload without the
    /// target code. Callers surface that to the user and move on.
    pub async fn exchange_rate(&self, from: &str, to: &str) -> Option<Rate> {
        if from == to {
            return Some(Rate {
                value: 1.0,
                fetched_at: None,
            });
        }

        let key = format!("{from}_{to}");
        let now = self.clock.now();

        {
            let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(entry) = cache.get(&key) {
                if now - entry.fetched_at < Duration::seconds(CACHE_TTL_SECS) {
                    return Some(Rate {
                        value: entry.rate,
                        fetched_at: Some(entry.fetched_at),
                    });
                }
            }
        }

        let rates = match self.source.latest_rates(from).await {
            Ok(rates) => rates,
            Err(err) => {
                tracing::warn!("exchange rate fetch for {from} failed: {err}");
                return None;
            }
        };

        let Some(&value) = rates.get(to) else {
            tracing::warn!("provider payload for {from} is missing {to}");
            return None;
        };

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.insert(
            key,
            CacheEntry {
                rate: value,
                fetched_at: now,
            },
        );

        Some(Rate {
            value,
            fetched_at: Some(now),
        })
    }

    /// Converts `amount` from one currency to another, rounding to cents.
    pub async fn convert(&self, amount: f64, from: &str, to: &str) -> Option<Conversion> {
        let rate = self.exchange_rate(from, to).await?;

        Some(Conversion {
            original_amount: amount,
            original_currency: from.to_string(),
            target_currency: to.to_string(),
            converted_amount: round2(amount * rate.value),
            exchange_rate: rate.value,
        })
    }
}

impl std::fmt::Debug for CurrencyService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrencyService").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubSource {
        calls: Arc<AtomicUsize>,
        rates: HashMap<String, f64>,
    }

    #[async_trait::async_trait]
    impl RateSource for StubSource {
        async fn latest_rates(
            &self,
            _base: &str,
        ) -> Result<HashMap<String, f64>, RateSourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.rates.clone())
        }
    }

    struct FailingSource;

    #[async_trait::async_trait]
    impl RateSource for FailingSource {
        async fn latest_rates(
            &self,
            _base: &str,
        ) -> Result<HashMap<String, f64>, RateSourceError> {
            Err(RateSourceError::Status(503))
        }
    }

    struct ManualClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        fn at(now: DateTime<Utc>) -> Arc<Self> {
            Arc::new(Self {
                now: Mutex::new(now),
            })
        }

        fn advance(&self, delta: Duration) {
            let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
            *now = *now + delta;
        }
    }

    impl Clock for Arc<ManualClock> {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    fn usd_rates() -> HashMap<String, f64> {
        HashMap::from([("EUR".to_string(), 0.9), ("GBP".to_string(), 0.8)])
    }

    fn service_with(
        rates: HashMap<String, f64>,
    ) -> (CurrencyService, Arc<AtomicUsize>, Arc<ManualClock>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let clock = ManualClock::at(Utc::now());
        let service = CurrencyService::new(
            Box::new(StubSource {
                calls: calls.clone(),
                rates,
            }),
            Box::new(clock.clone()),
        );
        (service, calls, clock)
    }

    #[tokio::test]
    async fn same_currency_never_calls_out() {
        let (service, calls, _clock) = service_with(usd_rates());

        let rate = service.exchange_rate("USD", "USD").await.unwrap();
        assert_eq!(rate.value, 1.0);
        assert_eq!(rate.fetched_at, None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cached_rate_reused_within_ttl() {
        let (service, calls, clock) = service_with(usd_rates());

        let first = service.exchange_rate("USD", "EUR").await.unwrap();
        clock.advance(Duration::minutes(59));
        let second = service.exchange_rate("USD", "EUR").await.unwrap();

        assert_eq!(first.value, 0.9);
        assert_eq!(second.fetched_at, first.fetched_at);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_rate_triggers_fresh_fetch() {
        let (service, calls, clock) = service_with(usd_rates());

        service.exchange_rate("USD", "EUR").await.unwrap();
        clock.advance(Duration::hours(1));
        let refreshed = service.exchange_rate("USD", "EUR").await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(refreshed.fetched_at, Some(clock.now()));
    }

    #[tokio::test]
    async fn missing_target_code_is_unavailable() {
        let (service, _calls, _clock) = service_with(usd_rates());

        assert!(service.exchange_rate("USD", "JPY").await.is_none());
    }

    #[tokio::test]
    async fn provider_failure_is_unavailable_not_fatal() {
        let service = CurrencyService::new(
            Box::new(FailingSource),
            Box::new(ManualClock::at(Utc::now())),
        );

        assert!(service.exchange_rate("USD", "EUR").await.is_none());
        assert!(service.convert(10.0, "USD", "EUR").await.is_none());
    }

    #[tokio::test]
    async fn convert_rounds_and_echoes_codes() {
        let (service, _calls, _clock) = service_with(usd_rates());

        let conversion = service.convert(10.0, "USD", "EUR").await.unwrap();
        assert_eq!(conversion.original_amount, 10.0);
        assert_eq!(conversion.original_currency, "USD");
        assert_eq!(conversion.target_currency, "EUR");
        assert_eq!(conversion.converted_amount, 9.0);
        assert_eq!(conversion.exchange_rate, 0.9);
    }
}
