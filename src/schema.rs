//! DDL for the module's tables. Idempotent; the server runs it on startup.

use crate::error::AppError;
use sqlx::PgPool;

const CUSTOMERS_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS customers (
        id SERIAL PRIMARY KEY,
        customer_number TEXT NOT NULL UNIQUE,
        company_name TEXT,
        first_name TEXT,
        last_name TEXT,
        email TEXT,
        phone TEXT,
        mobile TEXT,
        website TEXT,
        customer_type TEXT NOT NULL DEFAULT 'individual',
        status TEXT NOT NULL DEFAULT 'active',
        credit_limit NUMERIC(15, 2),
        payment_terms TEXT,
        tax_id TEXT,
        notes TEXT,
        created_by INTEGER NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

const TICKETS_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS support_tickets (
        id SERIAL PRIMARY KEY,
        ticket_number TEXT NOT NULL UNIQUE,
        customer_id INTEGER REFERENCES customers (id),
        subject TEXT NOT NULL,
        description TEXT NOT NULL,
        priority TEXT NOT NULL DEFAULT 'medium',
        status TEXT NOT NULL DEFAULT 'open',
        category TEXT,
        assigned_to INTEGER,
        resolution TEXT,
        resolved_at TIMESTAMPTZ,
        created_by INTEGER NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_customers_status ON customers (status)",
    "CREATE INDEX IF NOT EXISTS idx_support_tickets_customer ON support_tickets (customer_id)",
    "CREATE INDEX IF NOT EXISTS idx_support_tickets_status ON support_tickets (status)",
];

/// Create `customers` and `support_tickets` (and their lookup indexes) if missing.
pub async fn ensure_tables(pool: &PgPool) -> Result<(), AppError> {
    for ddl in [CUSTOMERS_DDL, TICKETS_DDL].into_iter().chain(INDEXES.iter().copied()) {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .map_err(AppError::db("Failed to create module tables"))?;
    }
    tracing::info!("module tables ready");
    Ok(())
}
