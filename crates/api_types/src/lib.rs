use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RegisterRequest {
        pub email: String,
        pub full_name: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginRequest {
        pub email: String,
        pub password: String,
    }

    /// Bearer token issued on register/login.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Token {
        pub access_token: String,
        pub token_type: String,
    }
}

pub mod user {
    use super::*;

    /// Public view of a user (never carries the password hash).
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: i32,
        pub email: String,
        pub full_name: String,
        pub is_active: bool,
        pub is_admin: bool,
        pub preferred_currency: String,
        pub created_at: DateTime<Utc>,
    }

    /// Partial update; absent fields are left unchanged.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct UserUpdate {
        pub email: Option<String>,
        pub full_name: Option<String>,
        pub preferred_currency: Option<String>,
        pub is_active: Option<bool>,
        pub is_admin: Option<bool>,
    }
}

pub mod spending {
    use super::*;

    /// Payload for creating or replacing a spending.
    ///
    /// `currency` is the currency the amount was entered in; when omitted it
    /// defaults to the user's preferred currency.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SpendingNew {
        pub amount: f64,
        pub currency: Option<String>,
        pub category: String,
        pub location: String,
        pub description: Option<String>,
        pub label: Option<String>,
        pub date: NaiveDate,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SpendingView {
        pub id: i32,
        pub amount: f64,
        pub original_amount: f64,
        pub original_currency: String,
        pub display_currency: String,
        pub exchange_rate: f64,
        pub category: String,
        pub location: String,
        pub description: Option<String>,
        pub label: Option<String>,
        pub date: NaiveDate,
        pub user_id: i32,
        pub created_at: DateTime<Utc>,
        pub updated_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SpendingListQuery {
        pub skip: Option<u64>,
        pub limit: Option<u64>,
    }

    /// Result of a bulk re-conversion of a user's spendings.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BulkConversion {
        pub target_currency: String,
        pub updated: u64,
    }
}

pub mod dashboard {
    use super::*;
    use crate::spending::SpendingView;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryTotal {
        pub category: String,
        pub amount: f64,
    }

    /// One day of the trailing-week trend, formatted `MM/DD`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct DayTotal {
        pub date: String,
        pub amount: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DashboardStats {
        pub total_spending: f64,
        pub average_daily: f64,
        pub weekly_spending: f64,
        pub monthly_transactions: u64,
        pub highest_single_spending: f64,
        pub top_categories: Vec<CategoryTotal>,
        pub category_distribution: Vec<CategoryTotal>,
        pub weekly_trend: Vec<DayTotal>,
        pub recent_spendings: Vec<SpendingView>,
        pub currency: String,
    }
}

pub mod label {
    use super::*;
    use crate::dashboard::CategoryTotal;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LabelStats {
        pub label: String,
        pub total_spending: f64,
        pub transaction_count: u64,
        pub average_per_transaction: f64,
        pub highest_spending_amount: f64,
        pub highest_spending_date: NaiveDate,
        pub first_transaction_date: NaiveDate,
        pub last_transaction_date: NaiveDate,
        pub top_categories: Vec<CategoryTotal>,
        pub currency: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LabelsOverview {
        pub total_labels: u64,
        pub labels_stats: Vec<LabelStats>,
    }
}

pub mod currency {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CurrencyInfo {
        pub code: String,
        pub name: String,
        pub symbol: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RateView {
        pub from_currency: String,
        pub to_currency: String,
        pub rate: f64,
        /// When the rate was fetched from the provider; `None` for the
        /// `from == to` fast path, which never touches the cache.
        pub fetched_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ConvertRequest {
        pub amount: f64,
        pub from_currency: String,
        pub to_currency: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Conversion {
        pub original_amount: f64,
        pub original_currency: String,
        pub target_currency: String,
        pub converted_amount: f64,
        pub exchange_rate: f64,
    }
}

pub mod admin {
    use super::*;
    use crate::user::UserView;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AdminDashboard {
        pub total_users: u64,
        pub total_admins: u64,
        pub active_users: u64,
        pub inactive_users: u64,
        pub recent_users: Vec<UserView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AdminUserNew {
        pub email: String,
        pub full_name: String,
        pub password: String,
        #[serde(default)]
        pub is_admin: bool,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PageQuery {
        pub skip: Option<u64>,
        pub limit: Option<u64>,
    }
}

pub mod schema {
    use super::*;

    /// Presence of one expected column in the live schema.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ColumnStatus {
        pub table: String,
        pub column: String,
        pub present: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SchemaReport {
        pub backend: String,
        pub columns: Vec<ColumnStatus>,
    }
}
