//! Support-ticket handlers.

use crate::config::ListLimits;
use crate::error::AppError;
use crate::handlers::{arguments, SYSTEM_USER_ID};
use crate::models::{ticket_number, NewSupportTicket, SupportTicket, TICKET_COLUMNS};
use crate::plugin::ModuleRequest;
use crate::response::{created, success};
use crate::sql::{QueryBuilder, SqlArg};
use crate::state::ModuleState;
use crate::validation::RequestValidator;
use axum::response::Response;
use chrono::{DateTime, Utc};
use serde_json::json;

const DEFAULT_PRIORITY: &str = "medium";

/// SELECT for the ticket list: optional `customer_id` (must be an integer) and `status`.
pub(crate) fn list_query(req: &ModuleRequest, limits: ListLimits) -> Result<(String, Vec<SqlArg>), AppError> {
    let customer_id = req
        .query_param("customer_id")
        .map(|raw| {
            raw.parse::<i32>()
                .map_err(|_| AppError::BadRequest("Invalid customer_id".into()))
        })
        .transpose()?;

    let mut qb = QueryBuilder::new(format!("SELECT {} FROM support_tickets WHERE 1=1", TICKET_COLUMNS));
    qb.add_optional_condition("customer_id = $%d", customer_id)?
        .add_optional_condition("status = $%d", req.query_param("status"))?;
    let (mut sql, args) = qb.build();
    sql.push_str(&format!(" ORDER BY created_at DESC LIMIT {}", limits.default));
    Ok((sql, args))
}

/// `GET /support-tickets?customer_id=&status=`
pub async fn list(state: ModuleState, req: ModuleRequest) -> Result<Response, AppError> {
    let (sql, args) = list_query(&req, state.limits)?;
    tracing::debug!(sql = %sql, args = args.len(), "query");
    let tickets = sqlx::query_as_with::<_, SupportTicket, _>(&sql, arguments(args)?)
        .fetch_all(&state.pool)
        .await
        .map_err(AppError::db("Failed to fetch support tickets"))?;

    let count = tickets.len();
    Ok(success(json!({ "tickets": tickets, "count": count })))
}

/// `POST /support-tickets`
pub async fn create(state: ModuleState, req: ModuleRequest) -> Result<Response, AppError> {
    let new: NewSupportTicket = req.json()?;
    RequestValidator::required(&[("subject", &new.subject), ("description", &new.description)])?;

    let number = ticket_number(Utc::now());
    let sql = "INSERT INTO support_tickets (ticket_number, customer_id, subject, description, priority, category, created_by) \
               VALUES ($1, $2, $3, $4, $5, $6, $7) \
               RETURNING id, created_at";
    tracing::debug!(sql = %sql, ticket_number = %number, "query");
    let (id, created_at): (i32, DateTime<Utc>) = sqlx::query_as(sql)
        .bind(&number)
        .bind(new.customer_id)
        .bind(&new.subject)
        .bind(&new.description)
        .bind(new.priority.unwrap_or_else(|| DEFAULT_PRIORITY.to_string()))
        .bind(new.category)
        .bind(SYSTEM_USER_ID)
        .fetch_one(&state.pool)
        .await
        .map_err(AppError::db("Failed to create support ticket"))?;

    tracing::info!(id, ticket_number = %number, "support ticket created");
    Ok(created(json!({
        "id": id,
        "ticket_number": number,
        "created_at": created_at,
        "message": "Support ticket created successfully",
    })))
}
