//! Startup-time schema healing for production PostgreSQL databases.
//!
//! Deployments that predate the migration table can be missing columns the
//! entities expect. Healing inspects the live column set and issues the
//! additive `ALTER TABLE`/backfill statements needed to catch up, without
//! interrupting service. It is idempotent: with every column present the
//! plan is empty, and "already exists" races between concurrently starting
//! instances are logged and swallowed.
//!
//! SQLite (the embedded development variant) is skipped entirely; there the
//! migration set is authoritative.

use std::collections::HashSet;

use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, DbErr, Statement};

pub const USERS_TABLE: &str = "users";
pub const SPENDINGS_TABLE: &str = "spendings";

/// Columns later feature work added to `spendings`, in the order they are
/// probed and repaired.
pub const EXPECTED_SPENDING_COLUMNS: [&str; 5] = [
    "original_amount",
    "label",
    "original_currency",
    "display_currency",
    "exchange_rate",
];

pub const EXPECTED_USER_COLUMNS: [&str; 1] = ["preferred_currency"];

/// Outcome of one healing pass.
#[derive(Debug, Default)]
pub struct HealReport {
    /// True when the backend is embedded and healing does not apply.
    pub skipped: bool,
    /// Statements that were actually executed.
    pub applied: Vec<String>,
}

/// Presence of one expected column, for the diagnostics endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnPresence {
    pub table: &'static str,
    pub column: &'static str,
    pub present: bool,
}

/// Read-only schema report.
#[derive(Debug)]
pub struct SchemaReport {
    pub backend: &'static str,
    pub columns: Vec<ColumnPresence>,
}

/// Statements that bring `spendings` up to the expected column set.
///
/// Pure planning: callers feed in the observed columns, so a table that is
/// already complete produces an empty plan and a no-op run.
pub fn plan_spending_fixes(existing: &HashSet<String>) -> Vec<String> {
    let mut plan = Vec::new();

    if !existing.contains("original_amount") {
        plan.push("ALTER TABLE spendings ADD COLUMN original_amount DOUBLE PRECISION".to_string());
        plan.push(
            "UPDATE spendings SET original_amount = amount WHERE original_amount IS NULL"
                .to_string(),
        );
        plan.push("ALTER TABLE spendings ALTER COLUMN original_amount SET NOT NULL".to_string());
    }

    if !existing.contains("label") {
        plan.push("ALTER TABLE spendings ADD COLUMN label VARCHAR(100)".to_string());
    }

    if !existing.contains("original_currency") {
        plan.push("ALTER TABLE spendings ADD COLUMN original_currency VARCHAR(3)".to_string());
        plan.push(
            "UPDATE spendings SET original_currency = 'USD' WHERE original_currency IS NULL"
                .to_string(),
        );
    }

    if !existing.contains("display_currency") {
        plan.push("ALTER TABLE spendings ADD COLUMN display_currency VARCHAR(3)".to_string());
        plan.push(
            "UPDATE spendings SET display_currency = 'USD' WHERE display_currency IS NULL"
                .to_string(),
        );
    }

    if !existing.contains("exchange_rate") {
        plan.push("ALTER TABLE spendings ADD COLUMN exchange_rate DOUBLE PRECISION".to_string());
        plan.push(
            "UPDATE spendings SET exchange_rate = 1.0 WHERE exchange_rate IS NULL".to_string(),
        );
    }

    plan
}

/// Statements that bring `users` up to the expected column set.
pub fn plan_user_fixes(existing: &HashSet<String>) -> Vec<String> {
    let mut plan = Vec::new();

    if !existing.contains("preferred_currency") {
        plan.push(
            "ALTER TABLE users ADD COLUMN preferred_currency VARCHAR(3) DEFAULT 'USD'".to_string(),
        );
        plan.push(
            "UPDATE users SET preferred_currency = 'USD' WHERE preferred_currency IS NULL"
                .to_string(),
        );
    }

    plan
}

fn is_duplicate_column(err: &DbErr) -> bool {
    let message = err.to_string().to_lowercase();
    message.contains("already exists") || message.contains("duplicate column")
}

async fn existing_columns(
    db: &DatabaseConnection,
    table: &str,
) -> Result<HashSet<String>, DbErr> {
    let backend = db.get_database_backend();
    let rows = match backend {
        DbBackend::Sqlite => {
            // Table names here are compile-time constants, not user input.
            db.query_all(Statement::from_string(
                backend,
                format!("PRAGMA table_info({table})"),
            ))
            .await?
        }
        _ => {
            db.query_all(Statement::from_sql_and_values(
                backend,
                "SELECT column_name AS name FROM information_schema.columns WHERE table_name = $1",
                [table.into()],
            ))
            .await?
        }
    };

    rows.iter()
        .map(|row| row.try_get::<String>("", "name"))
        .collect()
}

/// Runs one healing pass, returning what was applied.
///
/// Duplicate-column failures (another instance won the race) are logged and
/// skipped; any other database failure is returned to the caller, who is
/// expected to log it and keep serving.
pub async fn heal(db: &DatabaseConnection) -> Result<HealReport, DbErr> {
    let backend = db.get_database_backend();
    if backend == DbBackend::Sqlite {
        return Ok(HealReport {
            skipped: true,
            applied: Vec::new(),
        });
    }

    let spendings = existing_columns(db, SPENDINGS_TABLE).await?;
    let users = existing_columns(db, USERS_TABLE).await?;

    let mut plan = plan_spending_fixes(&spendings);
    plan.extend(plan_user_fixes(&users));

    let mut applied = Vec::new();
    for statement in plan {
        match db
            .execute(Statement::from_string(backend, statement.clone()))
            .await
        {
            Ok(_) => {
                tracing::info!("schema heal applied: {statement}");
                applied.push(statement);
            }
            Err(err) if is_duplicate_column(&err) => {
                tracing::warn!("schema heal lost a race on '{statement}': {err}");
            }
            Err(err) => return Err(err),
        }
    }

    Ok(HealReport {
        skipped: false,
        applied,
    })
}

/// Reports which expected columns are present, without modifying anything.
pub async fn report(db: &DatabaseConnection) -> Result<SchemaReport, DbErr> {
    let backend = match db.get_database_backend() {
        DbBackend::Sqlite => "sqlite",
        DbBackend::Postgres => "postgres",
        DbBackend::MySql => "mysql",
    };

    let spendings = existing_columns(db, SPENDINGS_TABLE).await?;
    let users = existing_columns(db, USERS_TABLE).await?;

    let mut columns = Vec::new();
    for column in EXPECTED_SPENDING_COLUMNS {
        columns.push(ColumnPresence {
            table: SPENDINGS_TABLE,
            column,
            present: spendings.contains(column),
        });
    }
    for column in EXPECTED_USER_COLUMNS {
        columns.push(ColumnPresence {
            table: USERS_TABLE,
            column,
            present: users.contains(column),
        });
    }

    Ok(SchemaReport { backend, columns })
}
