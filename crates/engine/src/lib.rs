//! Domain crate for the budget tracker: entities, currency conversion,
//! schema healing, and the operations the server exposes over HTTP.

pub use currency::{CurrencyInfo, normalize_code, round2, supported_currencies, symbol};
pub use error::EngineError;
pub use ops::{
    AdminCounts, CategoryTotal, DashboardStats, Engine, EngineBuilder, LabelStats, NewSpending,
    NewUser, UserChanges,
};
pub use rates::{
    Clock, Conversion, CurrencyService, DEFAULT_RATE_API, HttpRateSource, Rate, RateSource,
    RateSourceError, SystemClock,
};

mod currency;
mod error;
mod ops;
mod rates;

pub mod password;
pub mod schema;
pub mod spendings;
pub mod users;

type ResultEngine<T> = Result<T, EngineError>;
