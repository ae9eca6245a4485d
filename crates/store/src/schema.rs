//! Connection setup and schema bootstrap.
//!
//! The schema is created idempotently at startup (`CREATE TABLE IF NOT
//! EXISTS`); there is no migration history, matching the tens-of-rows scale
//! of this system.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::{StoreError, StoreResult};

/// Open a pool against `url` (e.g. `sqlite://crewpay.db?mode=rwc` or
/// `sqlite::memory:`), creating the file if missing and enabling foreign
/// keys on every connection.
///
/// In-memory databases get a single connection, otherwise each pooled
/// connection would see its own empty database.
pub async fn connect(url: &str) -> StoreResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)
        .map_err(StoreError::db(format!("parsing database url {url}")))?
        .create_if_missing(true)
        .foreign_keys(true);

    let mut pool_options = SqlitePoolOptions::new();
    if url.contains(":memory:") {
        pool_options = pool_options.max_connections(1);
    }

    pool_options
        .connect_with(options)
        .await
        .map_err(StoreError::db(format!("connecting to {url}")))
}

/// Create all tables and indexes if they do not exist yet.
pub async fn init_schema(pool: &SqlitePool) -> StoreResult<()> {
    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS consultants (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            role TEXT NOT NULL,
            hourly_rate INTEGER NOT NULL,
            active INTEGER NOT NULL DEFAULT 1,
            client_invoice_service_name TEXT,
            client_invoice_unit_price INTEGER,
            client_invoice_service_description TEXT,
            contract_signed_date TEXT,
            termination_date TEXT,
            termination_reason TEXT,
            equipment_return_deadline TEXT,
            created_at TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS equipment_items (
            id TEXT PRIMARY KEY,
            consultant_id TEXT NOT NULL REFERENCES consultants(id) ON DELETE CASCADE,
            label TEXT NOT NULL,
            serial_number TEXT,
            assigned_on TEXT NOT NULL,
            returned_on TEXT
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS payroll_cycles (
            id TEXT PRIMARY KEY,
            month_label TEXT NOT NULL UNIQUE,
            work_hours REAL NOT NULL,
            invoice_bonus INTEGER,
            bonus_recipient_id TEXT REFERENCES consultants(id),
            hours_entered_at TEXT,
            invoices_sent_at TEXT,
            payments_done_at TEXT,
            archived INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS cycle_line_items (
            id TEXT PRIMARY KEY,
            cycle_id TEXT NOT NULL REFERENCES payroll_cycles(id) ON DELETE CASCADE,
            consultant_id TEXT NOT NULL REFERENCES consultants(id),
            rate_snapshot INTEGER NOT NULL,
            work_hours_override REAL,
            bonus_date TEXT,
            bonus_announced_date TEXT,
            adjustment INTEGER NOT NULL DEFAULT 0,
            adjustment_note TEXT,
            UNIQUE (cycle_id, consultant_id)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS client_invoices (
            id TEXT PRIMARY KEY,
            cycle_id TEXT NOT NULL REFERENCES payroll_cycles(id),
            invoice_number INTEGER NOT NULL UNIQUE,
            status TEXT NOT NULL,
            issue_date TEXT NOT NULL,
            sent_date TEXT,
            approved_date TEXT,
            paid_date TEXT,
            subtotal INTEGER NOT NULL,
            tax INTEGER NOT NULL,
            total INTEGER NOT NULL,
            amount_due INTEGER NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
        // Backstop for the application-level duplicate check: at most one
        // non-cancelled invoice per cycle.
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_client_invoices_active_cycle
            ON client_invoices (cycle_id) WHERE status != 'CANCELLED'
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS invoice_line_items (
            id TEXT PRIMARY KEY,
            invoice_id TEXT NOT NULL REFERENCES client_invoices(id) ON DELETE CASCADE,
            service_name TEXT NOT NULL,
            description TEXT NOT NULL,
            quantity INTEGER NOT NULL,
            rate INTEGER NOT NULL,
            amount INTEGER NOT NULL,
            position INTEGER NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS invoice_line_item_consultants (
            line_item_id TEXT NOT NULL REFERENCES invoice_line_items(id) ON DELETE CASCADE,
            consultant_id TEXT NOT NULL REFERENCES consultants(id),
            position INTEGER NOT NULL,
            PRIMARY KEY (line_item_id, consultant_id)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS invoice_number_sequence (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            next_number INTEGER NOT NULL
        )
        "#,
    ];

    for statement in statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(StoreError::db("initializing schema"))?;
    }
    Ok(())
}
