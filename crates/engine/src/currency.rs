//! Supported currency metadata and amount rounding.
//!
//! The service converts between arbitrary ISO 4217 codes returned by the
//! rate provider, so codes are validated strings rather than a closed enum.
//! This table only drives the currency picker and symbol display.

use crate::{EngineError, ResultEngine};

/// Descriptor for one supported currency.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurrencyInfo {
    pub code: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
}

const SUPPORTED: [CurrencyInfo; 20] = [
    CurrencyInfo { code: "USD", name: "US Dollar", symbol: "$" },
    CurrencyInfo { code: "EUR", name: "Euro", symbol: "€" },
    CurrencyInfo { code: "GBP", name: "British Pound", symbol: "£" },
    CurrencyInfo { code: "JPY", name: "Japanese Yen", symbol: "¥" },
    CurrencyInfo { code: "AUD", name: "Australian Dollar", symbol: "A$" },
    CurrencyInfo { code: "CAD", name: "Canadian Dollar", symbol: "C$" },
    CurrencyInfo { code: "CHF", name: "Swiss Franc", symbol: "CHF" },
    CurrencyInfo { code: "CNY", name: "Chinese Yuan", symbol: "¥" },
    CurrencyInfo { code: "INR", name: "Indian Rupee", symbol: "₹" },
    CurrencyInfo { code: "KRW", name: "South Korean Won", symbol: "₩" },
    CurrencyInfo { code: "SGD", name: "Singapore Dollar", symbol: "S$" },
    CurrencyInfo { code: "HKD", name: "Hong Kong Dollar", symbol: "HK$" },
    CurrencyInfo { code: "NZD", name: "New Zealand Dollar", symbol: "NZ$" },
    CurrencyInfo { code: "SEK", name: "Swedish Krona", symbol: "kr" },
    CurrencyInfo { code: "NOK", name: "Norwegian Krone", symbol: "kr" },
    CurrencyInfo { code: "MXN", name: "Mexican Peso", symbol: "$" },
    CurrencyInfo { code: "BRL", name: "Brazilian Real", symbol: "R$" },
    CurrencyInfo { code: "ZAR", name: "South African Rand", symbol: "R" },
    CurrencyInfo { code: "THB", name: "Thai Baht", symbol: "฿" },
    CurrencyInfo { code: "MYR", name: "Malaysian Ringgit", symbol: "RM" },
];

/// Fixed list of currencies offered in the UI. Pure data.
#[must_use]
pub fn supported_currencies() -> &'static [CurrencyInfo] {
    &SUPPORTED
}

/// Display symbol for a code, falling back to the code itself.
#[must_use]
pub fn symbol(code: &str) -> &str {
    SUPPORTED
        .iter()
        .find(|info| info.code == code)
        .map_or(code, |info| info.symbol)
}

/// Normalizes user input into an upper-case three-letter currency code.
pub fn normalize_code(raw: &str) -> ResultEngine<String> {
    let code = raw.trim().to_ascii_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(EngineError::Invalid(format!(
            "invalid currency code: {raw}"
        )));
    }
    Ok(code)
}

/// Rounds a monetary amount to 2 decimal places.
///
/// Every stored `amount` and every conversion result goes through this, so
/// `amount = round(original_amount * exchange_rate, 2)` holds by
/// construction.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
