//! Row and payload types for the `customers` and `support_tickets` tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Select list for [`Customer`]; numeric columns come back as float8.
pub const CUSTOMER_COLUMNS: &str = "id, customer_number, company_name, first_name, last_name, email, \
     phone, mobile, website, customer_type, status, credit_limit::float8 AS credit_limit, \
     payment_terms, tax_id, notes, created_by, created_at, updated_at";

pub const TICKET_COLUMNS: &str = "id, ticket_number, customer_id, subject, description, priority, \
     status, category, assigned_to, resolution, resolved_at, created_by, created_at, updated_at";

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct Customer {
    pub id: i32,
    pub customer_number: String,
    pub company_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub website: Option<String>,
    pub customer_type: String,
    pub status: String,
    pub credit_limit: Option<f64>,
    pub payment_terms: Option<String>,
    pub tax_id: Option<String>,
    pub notes: Option<String>,
    pub created_by: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewCustomer {
    pub company_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub website: Option<String>,
    pub customer_type: Option<String>,
    pub credit_limit: Option<f64>,
    pub payment_terms: Option<String>,
    pub tax_id: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct SupportTicket {
    pub id: i32,
    pub ticket_number: String,
    pub customer_id: Option<i32>,
    pub subject: String,
    pub description: String,
    pub priority: String,
    pub status: String,
    pub category: Option<String>,
    pub assigned_to: Option<i32>,
    pub resolution: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_by: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewSupportTicket {
    pub subject: String,
    pub description: String,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub customer_id: Option<i32>,
}

/// `CUST-<unix seconds>`; unique only to clock resolution.
pub fn customer_number(now: DateTime<Utc>) -> String {
    format!("CUST-{}", now.timestamp())
}

/// `TKT-<unix seconds>`; unique only to clock resolution.
pub fn ticket_number(now: DateTime<Utc>) -> String {
    format!("TKT-{}", now.timestamp())
}
